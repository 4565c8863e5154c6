//! Common types for Lightshow
//!
//! Fundamental constants and value types shared by the control loop and
//! its collaborators.

/// Capture sample rate (8kHz mono is plenty for a loudness envelope)
pub const SAMPLE_RATE: u32 = 8000;

/// Capture channel count
pub const CAPTURE_CHANNELS: u16 = 1;

/// Normalization divisor applied to the RMS of i16 samples.
///
/// This is the full unsigned 16-bit range, so a full-scale square wave
/// normalizes to roughly 0.5. The loudness curve multiplier is tuned
/// against this divisor.
pub const MAX_AMPLITUDE: f32 = 65535.0;

/// Number of fixtures driven by the control loop
pub const NUM_FIXTURES: usize = 2;

/// Duty cycle value for a fully lit channel (duty cycles are in percent)
pub const DUTY_SCALE: f32 = 100.0;

/// PWM base frequencies below this are visibly flickery for most people
pub const MIN_FLICKER_FREE_HZ: f32 = 80.0;

/// Mono samples captured since the previous read
pub type AudioFrame = Vec<i16>;

/// Color channel identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Green,
    Blue,
}

impl Color {
    /// All channels in update order
    pub const ALL: [Color; 3] = [Color::Red, Color::Green, Color::Blue];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "red",
            Color::Green => "green",
            Color::Blue => "blue",
        }
    }
}

/// Per-channel brightness triple, each component in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);

    pub const fn new(red: f32, green: f32, blue: f32) -> Self {
        Self { red, green, blue }
    }

    /// Component for a given channel
    pub fn get(&self, color: Color) -> f32 {
        match color {
            Color::Red => self.red,
            Color::Green => self.green,
            Color::Blue => self.blue,
        }
    }
}
