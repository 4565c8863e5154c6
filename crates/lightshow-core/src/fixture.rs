//! RGB fixture: three smoothed channels sharing one hue

use crate::channel::ChannelFilter;
use crate::config::{ChannelConfig, FixtureConfig};
use crate::hardware::{HardwareResult, OutputBackend, PwmChannel};
use crate::types::{Color, Rgb};

/// One RGB fixture and the three PWM channels it owns
#[derive(Debug)]
pub struct Fixture<C: PwmChannel> {
    name: String,
    red: ChannelFilter<C>,
    green: ChannelFilter<C>,
    blue: ChannelFilter<C>,
    cleaned_up: bool,
}

impl<C: PwmChannel> Fixture<C> {
    /// Build a fixture from three already-opened channels
    pub fn new(name: impl Into<String>, red: C, green: C, blue: C, config: &ChannelConfig) -> Self {
        Self {
            name: name.into(),
            red: ChannelFilter::new(red, config),
            green: ChannelFilter::new(green, config),
            blue: ChannelFilter::new(blue, config),
            cleaned_up: false,
        }
    }

    /// Open the fixture's three pins on `backend`
    ///
    /// If a later pin fails to open, the pins already opened are stopped
    /// before the error is returned.
    pub fn open<B>(
        backend: &mut B,
        fixture: &FixtureConfig,
        channel: &ChannelConfig,
        pwm_frequency_hz: f32,
    ) -> HardwareResult<Self>
    where
        B: OutputBackend<Channel = C>,
    {
        let pins = &fixture.pins;
        let red = backend.open_channel(pins.red, pwm_frequency_hz)?;
        let green = match backend.open_channel(pins.green, pwm_frequency_hz) {
            Ok(output) => output,
            Err(e) => {
                abandon(&fixture.name, [red]);
                return Err(e);
            }
        };
        let blue = match backend.open_channel(pins.blue, pwm_frequency_hz) {
            Ok(output) => output,
            Err(e) => {
                abandon(&fixture.name, [red, green]);
                return Err(e);
            }
        };

        log::info!(
            "[{}] Fixture ready on pins {}/{}/{} at {}Hz",
            fixture.name,
            pins.red,
            pins.green,
            pins.blue,
            pwm_frequency_hz
        );
        Ok(Self::new(fixture.name.clone(), red, green, blue, channel))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Channel filter for a color
    pub fn channel(&self, color: Color) -> &ChannelFilter<C> {
        match color {
            Color::Red => &self.red,
            Color::Green => &self.green,
            Color::Blue => &self.blue,
        }
    }

    fn channel_mut(&mut self, color: Color) -> &mut ChannelFilter<C> {
        match color {
            Color::Red => &mut self.red,
            Color::Green => &mut self.green,
            Color::Blue => &mut self.blue,
        }
    }

    /// Push new target brightnesses into all three channels, red first
    pub fn update(&mut self, rgb: Rgb) -> HardwareResult<()> {
        for color in Color::ALL {
            self.channel_mut(color).update(rgb.get(color))?;
        }
        Ok(())
    }

    /// Mean smoothed brightness across the three channels
    pub fn aggregate_brightness(&self) -> f32 {
        (self.red.current() + self.green.current() + self.blue.current()) / 3.0
    }

    /// Stop all three channels
    ///
    /// Every channel is attempted even if an earlier one fails; the first
    /// failure is returned. Only the first call does anything.
    pub fn cleanup(&mut self) -> HardwareResult<()> {
        if self.cleaned_up {
            return Ok(());
        }
        self.cleaned_up = true;

        let mut first_error = None;
        for color in Color::ALL {
            if let Err(e) = self.channel_mut(color).stop() {
                log::error!("[{}] Failed to stop {} channel: {}", self.name, color.name(), e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => {
                log::debug!("[{}] Fixture cleaned up", self.name);
                Ok(())
            }
        }
    }
}

/// Stop channels of a fixture that failed to open completely
fn abandon<C: PwmChannel>(name: &str, outputs: impl IntoIterator<Item = C>) {
    for mut output in outputs {
        if let Err(e) = output.stop() {
            log::warn!("[{}] {}", name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RgbPins;
    use crate::hardware::{HardwareError, SimulatedBackend, SimulatedChannel, SimulatedProbe};

    fn fixture_config() -> FixtureConfig {
        FixtureConfig {
            name: "test".to_string(),
            pins: RgbPins {
                red: 11,
                green: 12,
                blue: 13,
            },
            hue_frequency_deg_per_sec: 12.0,
        }
    }

    fn snap_config() -> ChannelConfig {
        ChannelConfig {
            fade_factor: 1.0,
            zero_threshold: 0.005,
        }
    }

    fn open_fixture() -> (Fixture<SimulatedChannel>, SimulatedProbe) {
        let mut backend = SimulatedBackend::new();
        let probe = backend.probe();
        let fixture = Fixture::open(&mut backend, &fixture_config(), &snap_config(), 120.0).unwrap();
        (fixture, probe)
    }

    #[test]
    fn test_update_drives_each_pin() {
        let (mut fixture, probe) = open_fixture();
        fixture.update(Rgb::new(1.0, 0.5, 0.25)).unwrap();

        assert_eq!(probe.duty_cycle(11), Some(100.0));
        assert_eq!(probe.duty_cycle(12), Some(50.0));
        assert_eq!(probe.duty_cycle(13), Some(25.0));
        assert_eq!(fixture.channel(Color::Green).current(), 0.5);
    }

    #[test]
    fn test_aggregate_brightness_is_mean() {
        let (mut fixture, _probe) = open_fixture();
        fixture.update(Rgb::new(0.9, 0.3, 0.0)).unwrap();
        assert!((fixture.aggregate_brightness() - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_cleanup_zeroes_all_channels_once() {
        let (mut fixture, probe) = open_fixture();
        fixture.update(Rgb::new(1.0, 1.0, 1.0)).unwrap();

        fixture.cleanup().unwrap();
        fixture.cleanup().unwrap();

        for pin in [11, 12, 13] {
            let record = probe.channel(pin).unwrap();
            assert!(record.stopped);
            assert_eq!(record.duty_cycle, 0.0);
        }
        assert!(matches!(
            fixture.update(Rgb::BLACK),
            Err(HardwareError::Released { pin: 11 })
        ));
    }

    #[test]
    fn test_cleanup_continues_past_failure() {
        let (mut fixture, probe) = open_fixture();
        probe.fail_stop(11);

        assert!(matches!(
            fixture.cleanup(),
            Err(HardwareError::Stop { pin: 11, .. })
        ));
        assert!(probe.channel(12).unwrap().stopped);
        assert!(probe.channel(13).unwrap().stopped);
        assert!(fixture.channel(Color::Red).is_stopped());
    }

    #[test]
    fn test_failed_open_stops_earlier_pins() {
        let mut backend = SimulatedBackend::new();
        let probe = backend.probe();
        probe.fail_open(13);

        let result = Fixture::open(&mut backend, &fixture_config(), &snap_config(), 120.0);
        assert!(matches!(result, Err(HardwareError::PinUnavailable { pin: 13, .. })));
        assert!(probe.channel(11).unwrap().stopped);
        assert!(probe.channel(12).unwrap().stopped);
        assert!(probe.channel(13).is_none());
    }
}
