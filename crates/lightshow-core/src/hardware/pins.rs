//! Pin numbering schemes for the Raspberry Pi 40-pin header

use serde::{Deserialize, Serialize};

/// Highest BCM GPIO line exposed on the 40-pin header
const MAX_BCM_GPIO: u8 = 27;

/// How configured pin numbers are interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinNumbering {
    /// Physical position on the 40-pin header (1-40)
    #[default]
    Board,
    /// Broadcom GPIO line number (0-27)
    Bcm,
}

impl PinNumbering {
    /// Translate a configured pin into the BCM GPIO line that drives it
    ///
    /// Returns `None` for power/ground header positions and out-of-range numbers.
    pub fn to_bcm(self, pin: u8) -> Option<u8> {
        match self {
            PinNumbering::Board => board_to_bcm(pin),
            PinNumbering::Bcm => (pin <= MAX_BCM_GPIO).then_some(pin),
        }
    }
}

/// Map a physical header position to its BCM GPIO line
pub fn board_to_bcm(pin: u8) -> Option<u8> {
    let bcm = match pin {
        3 => 2,
        5 => 3,
        7 => 4,
        8 => 14,
        10 => 15,
        11 => 17,
        12 => 18,
        13 => 27,
        15 => 22,
        16 => 23,
        18 => 24,
        19 => 10,
        21 => 9,
        22 => 25,
        23 => 11,
        24 => 8,
        26 => 7,
        27 => 0,
        28 => 1,
        29 => 5,
        31 => 6,
        32 => 12,
        33 => 13,
        35 => 19,
        36 => 16,
        37 => 26,
        38 => 20,
        40 => 21,
        _ => return None,
    };
    Some(bcm)
}
