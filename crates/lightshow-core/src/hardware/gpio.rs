//! Raspberry Pi GPIO backend
//!
//! Uses `rppal` software PWM on every channel. The SoC only has two
//! hardware PWM lines and the fixtures need six.

use rppal::gpio::{Gpio, OutputPin};

use super::error::{HardwareError, HardwareResult};
use super::pins::PinNumbering;
use super::{OutputBackend, PwmChannel};
use crate::types::DUTY_SCALE;

/// GPIO-backed PWM outputs
pub struct GpioBackend {
    /// Open handle to the GPIO block, `None` once released
    gpio: Option<Gpio>,
    numbering: PinNumbering,
}

impl GpioBackend {
    /// Open the GPIO peripheral
    ///
    /// Fails when not running on a Raspberry Pi or without access to `/dev/gpiomem`.
    pub fn new(numbering: PinNumbering) -> HardwareResult<Self> {
        let gpio = Gpio::new().map_err(|e| HardwareError::Init(e.to_string()))?;
        log::info!("GPIO initialized ({:?} pin numbering)", numbering);
        Ok(Self {
            gpio: Some(gpio),
            numbering,
        })
    }
}

impl OutputBackend for GpioBackend {
    type Channel = GpioChannel;

    fn open_channel(&mut self, pin: u8, frequency_hz: f32) -> HardwareResult<GpioChannel> {
        let gpio = self
            .gpio
            .as_ref()
            .ok_or_else(|| HardwareError::Init("GPIO already released".to_string()))?;
        let bcm = self
            .numbering
            .to_bcm(pin)
            .ok_or(HardwareError::InvalidPin(pin))?;

        let mut output = gpio
            .get(bcm)
            .map_err(|e| HardwareError::PinUnavailable {
                pin,
                reason: e.to_string(),
            })?
            .into_output_low();
        // Pins are restored to inputs when the OutputPin drops
        output.set_reset_on_drop(true);
        output
            .set_pwm_frequency(frequency_hz as f64, 0.0)
            .map_err(|e| HardwareError::Write {
                pin,
                reason: e.to_string(),
            })?;

        log::debug!("Pin {} (GPIO{}) PWM started at {}Hz", pin, bcm, frequency_hz);

        Ok(GpioChannel {
            pin,
            frequency_hz: frequency_hz as f64,
            output: Some(output),
        })
    }

    fn release(&mut self) -> HardwareResult<()> {
        if self.gpio.take().is_some() {
            log::info!("GPIO released");
        }
        Ok(())
    }
}

/// One software-PWM output pin
pub struct GpioChannel {
    pin: u8,
    frequency_hz: f64,
    /// `None` once stopped
    output: Option<OutputPin>,
}

impl PwmChannel for GpioChannel {
    fn pin(&self) -> u8 {
        self.pin
    }

    fn set_duty_cycle(&mut self, percent: f32) -> HardwareResult<()> {
        let pin = self.pin;
        let output = self
            .output
            .as_mut()
            .ok_or(HardwareError::Released { pin })?;
        let duty = (percent / DUTY_SCALE).clamp(0.0, 1.0) as f64;
        output
            .set_pwm_frequency(self.frequency_hz, duty)
            .map_err(|e| HardwareError::Write {
                pin,
                reason: e.to_string(),
            })
    }

    fn stop(&mut self) -> HardwareResult<()> {
        let Some(mut output) = self.output.take() else {
            return Ok(());
        };
        let result = output.clear_pwm().map_err(|e| HardwareError::Stop {
            pin: self.pin,
            reason: e.to_string(),
        });
        // Leave the LED dark even if clearing the PWM thread failed
        output.set_low();
        result
    }
}
