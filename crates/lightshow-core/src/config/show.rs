//! Light show tunables
//!
//! Defaults reproduce the classic two-fixture setup: fixtures on header pins
//! 11/12/13 and 15/16/18, a slow 30 second hue rotation, and a steep
//! loudness curve that keeps room noise dark.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::hardware::PinNumbering;
use crate::types::{MIN_FLICKER_FREE_HZ, NUM_FIXTURES};

/// Errors found while validating a loaded configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A field is outside its allowed range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: String, reason: String },

    /// The same pin is wired to more than one channel
    #[error("Pin {pin} is assigned to more than one channel")]
    DuplicatePin { pin: u8 },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Volume to brightness response curve: `B(v) = multiplier * v^exponent`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoudnessConfig {
    /// Exponent applied to the normalized RMS volume
    /// Larger values push quiet noise further toward zero.
    /// Default: 5.0
    pub exponent: f32,

    /// Multiplier applied after the exponent
    /// Default: 50.0
    pub multiplier: f32,

    /// Optional pre-curve gate: normalized volumes at or below this are
    /// treated as silence before the curve is applied.
    /// Default: disabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noise_gate: Option<f32>,
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            exponent: 5.0,
            multiplier: 50.0,
            noise_gate: None,
        }
    }
}

/// Smoothing applied to every color channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    /// Fraction of the distance to the target covered per update.
    /// 1.0 snaps to the target instantly, 0.5 covers half the gap each frame.
    /// Default: 0.48
    pub fade_factor: f32,

    /// Smoothed brightness at or below this snaps to exactly zero
    /// Default: 0.005
    pub zero_threshold: f32,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            fade_factor: 0.48,
            zero_threshold: 0.005,
        }
    }
}

/// Pins driving the three LED channels of one fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RgbPins {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl RgbPins {
    pub fn as_array(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }
}

/// One RGB fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    /// Name used in log messages
    pub name: String,

    /// Output pins, numbered per `ShowConfig::pin_numbering`
    pub pins: RgbPins,

    /// Hue rotation speed in degrees per second
    /// Default: 12.0 (one full rotation every 30 seconds)
    pub hue_frequency_deg_per_sec: f32,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            name: "rgb1".to_string(),
            pins: RgbPins {
                red: 11,
                green: 12,
                blue: 13,
            },
            hue_frequency_deg_per_sec: 360.0 / 30.0,
        }
    }
}

/// Audio capture settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Longest the loop waits for new samples before treating the read as empty
    /// Default: 100ms
    pub read_timeout_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            read_timeout_ms: 100,
        }
    }
}

/// Complete light show configuration
///
/// Built once at startup and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowConfig {
    pub loudness: LoudnessConfig,
    pub channel: ChannelConfig,

    /// PWM base frequency in Hz. Values below ~80 flicker visibly.
    /// Default: 120.0
    pub pwm_frequency_hz: f32,

    /// How fixture pin numbers are interpreted
    /// Default: physical header positions
    pub pin_numbering: PinNumbering,

    pub fixtures: [FixtureConfig; NUM_FIXTURES],

    pub capture: CaptureConfig,
}

impl Default for ShowConfig {
    fn default() -> Self {
        Self {
            loudness: LoudnessConfig::default(),
            channel: ChannelConfig::default(),
            pwm_frequency_hz: 120.0,
            pin_numbering: PinNumbering::Board,
            fixtures: [
                FixtureConfig::default(),
                FixtureConfig {
                    name: "rgb2".to_string(),
                    pins: RgbPins {
                        red: 15,
                        green: 16,
                        blue: 18,
                    },
                    hue_frequency_deg_per_sec: 360.0 / 30.0,
                },
            ],
            capture: CaptureConfig::default(),
        }
    }
}

fn require_finite(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} is not a finite number", value)))
    }
}

impl ShowConfig {
    /// Check every value against its allowed range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let loudness = &self.loudness;
        require_finite("loudness.exponent", loudness.exponent)?;
        if loudness.exponent <= 0.0 {
            return Err(ConfigError::invalid("loudness.exponent", "must be greater than 0"));
        }
        require_finite("loudness.multiplier", loudness.multiplier)?;
        if loudness.multiplier < 0.0 {
            return Err(ConfigError::invalid("loudness.multiplier", "must not be negative"));
        }
        if let Some(gate) = loudness.noise_gate {
            require_finite("loudness.noise_gate", gate)?;
            if !(0.0..1.0).contains(&gate) {
                return Err(ConfigError::invalid("loudness.noise_gate", "must be in [0, 1)"));
            }
        }

        let channel = &self.channel;
        require_finite("channel.fade_factor", channel.fade_factor)?;
        if channel.fade_factor <= 0.0 || channel.fade_factor > 1.0 {
            return Err(ConfigError::invalid("channel.fade_factor", "must be in (0, 1]"));
        }
        require_finite("channel.zero_threshold", channel.zero_threshold)?;
        if !(0.0..1.0).contains(&channel.zero_threshold) {
            return Err(ConfigError::invalid("channel.zero_threshold", "must be in [0, 1)"));
        }

        require_finite("pwm_frequency_hz", self.pwm_frequency_hz)?;
        if self.pwm_frequency_hz <= 0.0 {
            return Err(ConfigError::invalid("pwm_frequency_hz", "must be greater than 0"));
        }
        if self.pwm_frequency_hz < MIN_FLICKER_FREE_HZ {
            log::warn!(
                "PWM frequency {}Hz is below {}Hz, fixtures will visibly flicker",
                self.pwm_frequency_hz,
                MIN_FLICKER_FREE_HZ
            );
        }

        let mut seen: Vec<u8> = Vec::with_capacity(NUM_FIXTURES * 3);
        for (i, fixture) in self.fixtures.iter().enumerate() {
            let field = format!("fixtures[{}].hue_frequency_deg_per_sec", i);
            require_finite(&field, fixture.hue_frequency_deg_per_sec)?;
            if fixture.hue_frequency_deg_per_sec < 0.0 {
                return Err(ConfigError::invalid(field, "must not be negative"));
            }
            for pin in fixture.pins.as_array() {
                if seen.contains(&pin) {
                    return Err(ConfigError::DuplicatePin { pin });
                }
                seen.push(pin);
            }
        }

        if self.capture.read_timeout_ms == 0 {
            return Err(ConfigError::invalid("capture.read_timeout_ms", "must be greater than 0"));
        }

        Ok(())
    }
}
