//! Audio loudness to brightness
//!
//! Maps a frame of raw samples to a brightness in [0, 1] through a power-law
//! response curve:
//!
//! ```text
//! norm       = rms(samples) / 65535
//! brightness = clamp(multiplier * norm^exponent, 0, 1)
//! ```
//!
//! A steep exponent crushes ambient noise toward zero while loud peaks still
//! saturate quickly. Exponent and multiplier are the only tunables.

use crate::config::LoudnessConfig;
use crate::types::MAX_AMPLITUDE;

/// Stateless loudness transform
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessTransform {
    exponent: f32,
    multiplier: f32,
    noise_gate: Option<f32>,
}

impl LoudnessTransform {
    pub fn new(config: &LoudnessConfig) -> Self {
        Self {
            exponent: config.exponent,
            multiplier: config.multiplier,
            noise_gate: config.noise_gate,
        }
    }

    /// RMS amplitude normalized by the full 16-bit range, 0.0 for an empty frame
    pub fn normalized_rms(samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        // i16² fits comfortably in f64 across any realistic frame length
        let sum_squares: f64 = samples
            .iter()
            .map(|&s| {
                let s = s as f64;
                s * s
            })
            .sum();
        let rms = (sum_squares / samples.len() as f64).sqrt();
        (rms / MAX_AMPLITUDE as f64) as f32
    }

    /// Apply the response curve to an already normalized volume
    pub fn apply_curve(&self, norm: f32) -> f32 {
        let norm = match self.noise_gate {
            Some(gate) if norm <= gate => 0.0,
            _ => norm,
        };
        if norm <= 0.0 {
            return 0.0;
        }
        (self.multiplier * norm.powf(self.exponent)).clamp(0.0, 1.0)
    }

    /// Brightness for a captured frame
    pub fn brightness(&self, samples: &[i16]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        self.apply_curve(Self::normalized_rms(samples))
    }
}
