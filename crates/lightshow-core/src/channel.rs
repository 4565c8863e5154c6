//! Smoothed brightness for one color channel
//!
//! Every frame the channel moves a fixed fraction of the way toward its
//! target brightness (a first-order IIR low-pass):
//!
//! ```text
//! current += (target - current) * fade_factor
//! ```
//!
//! With `fade_factor = 1.0` the channel snaps to the target. Smaller values
//! smooth more, with a time constant of roughly `-1 / ln(1 - fade_factor)`
//! frames.
//!
//! The decay toward zero is asymptotic, so anything at or below
//! `zero_threshold` is snapped to exactly zero. Otherwise LEDs would keep a
//! faint glow long after the room went quiet.

use crate::config::ChannelConfig;
use crate::hardware::{HardwareError, HardwareResult, PwmChannel};
use crate::types::DUTY_SCALE;

/// Exponential smoother driving one PWM output
#[derive(Debug)]
pub struct ChannelFilter<C: PwmChannel> {
    /// Hardware output, `None` once stopped
    output: Option<C>,
    /// Pin number, kept for errors after the output is released
    pin: u8,
    /// Smoothed brightness, 0.0 or in (zero_threshold, 1.0]
    current: f32,
    /// Last duty cycle written, percent
    duty_cycle: f32,
    fade_factor: f32,
    zero_threshold: f32,
}

impl<C: PwmChannel> ChannelFilter<C> {
    pub fn new(output: C, config: &ChannelConfig) -> Self {
        Self {
            pin: output.pin(),
            output: Some(output),
            current: 0.0,
            duty_cycle: 0.0,
            fade_factor: config.fade_factor,
            zero_threshold: config.zero_threshold,
        }
    }

    /// Current smoothed brightness in [0, 1]
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Last duty cycle written to the hardware, percent
    pub fn duty_cycle(&self) -> f32 {
        self.duty_cycle
    }

    pub fn pin(&self) -> u8 {
        self.pin
    }

    /// Whether the output has been stopped and released
    pub fn is_stopped(&self) -> bool {
        self.output.is_none()
    }

    /// Fade toward `target` and write the resulting duty cycle
    ///
    /// Non-finite targets are sanitized: NaN counts as dark, infinities
    /// clamp to the ends of the range.
    pub fn update(&mut self, target: f32) -> HardwareResult<()> {
        let Some(output) = self.output.as_mut() else {
            return Err(HardwareError::Released { pin: self.pin });
        };

        let target = if target.is_nan() {
            log::debug!("Pin {}: NaN brightness target treated as 0", self.pin);
            0.0
        } else {
            target.clamp(0.0, 1.0)
        };

        let mut next = if self.fade_factor >= 1.0 {
            target
        } else {
            let stepped = self.current + (target - self.current) * self.fade_factor;
            // Rounding must never carry the value past the target
            stepped.clamp(self.current.min(target), self.current.max(target))
        };
        if next <= self.zero_threshold {
            next = 0.0;
        }
        self.current = next;

        let duty = self.current * DUTY_SCALE;
        output.set_duty_cycle(duty)?;
        self.duty_cycle = duty;
        Ok(())
    }

    /// Zero the output and release the hardware handle
    ///
    /// The handle is released even if stopping it reports an error. A second
    /// call does nothing.
    pub fn stop(&mut self) -> HardwareResult<()> {
        let Some(mut output) = self.output.take() else {
            return Ok(());
        };
        self.current = 0.0;
        self.duty_cycle = 0.0;
        output.stop()
    }
}
