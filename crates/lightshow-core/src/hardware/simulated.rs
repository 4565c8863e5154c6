//! In-memory PWM backend
//!
//! Tracks the current duty cycle of every pin. Used by `--dry-run` on
//! machines without a GPIO header and by tests, which can also keep the full
//! write history and inject failures on specific pins.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::error::{HardwareError, HardwareResult};
use super::{OutputBackend, PwmChannel};

/// Everything observed on one simulated pin
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelRecord {
    /// PWM base frequency the channel was opened with
    pub frequency_hz: f32,
    /// Current duty cycle in percent
    pub duty_cycle: f32,
    /// Every duty cycle written, in order (not including the stop)
    ///
    /// Only filled by a backend built with [`SimulatedBackend::recording`].
    pub history: Vec<f32>,
    /// Whether the channel has been stopped
    pub stopped: bool,
    /// Writes attempted after the channel was stopped
    pub writes_after_stop: usize,
}

#[derive(Debug, Default)]
struct SimState {
    channels: BTreeMap<u8, ChannelRecord>,
    released: bool,
    record_history: bool,
    fail_open: HashSet<u8>,
    fail_write: HashSet<u8>,
    fail_stop: HashSet<u8>,
}

/// Shared view into a simulated backend's state
#[derive(Debug, Clone, Default)]
pub struct SimulatedProbe {
    state: Arc<Mutex<SimState>>,
}

impl SimulatedProbe {
    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Snapshot of one pin's record
    pub fn channel(&self, pin: u8) -> Option<ChannelRecord> {
        self.lock().channels.get(&pin).cloned()
    }

    /// Current duty cycle of a pin
    pub fn duty_cycle(&self, pin: u8) -> Option<f32> {
        self.lock().channels.get(&pin).map(|c| c.duty_cycle)
    }

    /// All pins that were ever opened, ascending
    pub fn pins(&self) -> Vec<u8> {
        self.lock().channels.keys().copied().collect()
    }

    /// Whether `OutputBackend::release` has been called
    pub fn is_released(&self) -> bool {
        self.lock().released
    }

    /// Make `open_channel` fail for this pin
    pub fn fail_open(&self, pin: u8) {
        self.lock().fail_open.insert(pin);
    }

    /// Make duty-cycle writes fail for this pin
    pub fn fail_write(&self, pin: u8) {
        self.lock().fail_write.insert(pin);
    }

    /// Make stopping this pin fail
    pub fn fail_stop(&self, pin: u8) {
        self.lock().fail_stop.insert(pin);
    }
}

/// PWM backend that only records what it is told
#[derive(Debug, Default)]
pub struct SimulatedBackend {
    probe: SimulatedProbe,
}

impl SimulatedBackend {
    /// Backend that keeps only the latest state of each pin
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that also keeps every duty cycle written
    ///
    /// History grows with every write, so this is for bounded runs only.
    pub fn recording() -> Self {
        let backend = Self::default();
        backend.probe.lock().record_history = true;
        backend
    }

    /// Handle for inspecting this backend after it has been moved into the loop
    pub fn probe(&self) -> SimulatedProbe {
        self.probe.clone()
    }
}

impl OutputBackend for SimulatedBackend {
    type Channel = SimulatedChannel;

    fn open_channel(&mut self, pin: u8, frequency_hz: f32) -> HardwareResult<SimulatedChannel> {
        let mut state = self.probe.lock();
        if state.released {
            return Err(HardwareError::Init("backend already released".to_string()));
        }
        if state.fail_open.contains(&pin) {
            return Err(HardwareError::PinUnavailable {
                pin,
                reason: "simulated open failure".to_string(),
            });
        }
        if state.channels.get(&pin).is_some_and(|c| !c.stopped) {
            return Err(HardwareError::PinUnavailable {
                pin,
                reason: "already in use".to_string(),
            });
        }

        state.channels.insert(
            pin,
            ChannelRecord {
                frequency_hz,
                ..Default::default()
            },
        );
        log::debug!("[sim] Opened pin {} at {}Hz", pin, frequency_hz);

        Ok(SimulatedChannel {
            pin,
            probe: self.probe.clone(),
            stopped: false,
        })
    }

    fn release(&mut self) -> HardwareResult<()> {
        self.probe.lock().released = true;
        log::debug!("[sim] Backend released");
        Ok(())
    }
}

/// One simulated PWM output
#[derive(Debug)]
pub struct SimulatedChannel {
    pin: u8,
    probe: SimulatedProbe,
    stopped: bool,
}

impl PwmChannel for SimulatedChannel {
    fn pin(&self) -> u8 {
        self.pin
    }

    fn set_duty_cycle(&mut self, percent: f32) -> HardwareResult<()> {
        let mut state = self.probe.lock();
        let failing = state.fail_write.contains(&self.pin);
        let record_history = state.record_history;
        let record = state.channels.entry(self.pin).or_default();

        if self.stopped {
            record.writes_after_stop += 1;
            return Err(HardwareError::Released { pin: self.pin });
        }
        if failing {
            return Err(HardwareError::Write {
                pin: self.pin,
                reason: "simulated write failure".to_string(),
            });
        }

        record.duty_cycle = percent;
        if record_history {
            record.history.push(percent);
        }
        log::trace!("[sim] pin {} duty {:.2}%", self.pin, percent);
        Ok(())
    }

    fn stop(&mut self) -> HardwareResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;

        let mut state = self.probe.lock();
        if state.fail_stop.contains(&self.pin) {
            return Err(HardwareError::Stop {
                pin: self.pin,
                reason: "simulated stop failure".to_string(),
            });
        }
        let record = state.channels.entry(self.pin).or_default();
        record.duty_cycle = 0.0;
        record.stopped = true;
        log::debug!("[sim] Stopped pin {}", self.pin);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes_in_order() {
        let mut backend = SimulatedBackend::recording();
        let probe = backend.probe();
        let mut channel = backend.open_channel(11, 120.0).unwrap();

        channel.set_duty_cycle(25.0).unwrap();
        channel.set_duty_cycle(50.0).unwrap();

        let record = probe.channel(11).unwrap();
        assert_eq!(record.frequency_hz, 120.0);
        assert_eq!(record.history, vec![25.0, 50.0]);
        assert_eq!(record.duty_cycle, 50.0);
    }

    #[test]
    fn test_stop_zeroes_and_blocks_writes() {
        let mut backend = SimulatedBackend::new();
        let probe = backend.probe();
        let mut channel = backend.open_channel(12, 120.0).unwrap();

        channel.set_duty_cycle(80.0).unwrap();
        channel.stop().unwrap();
        channel.stop().unwrap();

        assert_eq!(
            channel.set_duty_cycle(10.0),
            Err(HardwareError::Released { pin: 12 })
        );
        let record = probe.channel(12).unwrap();
        assert!(record.stopped);
        assert_eq!(record.duty_cycle, 0.0);
        assert_eq!(record.writes_after_stop, 1);
    }

    #[test]
    fn test_pin_cannot_be_opened_twice() {
        let mut backend = SimulatedBackend::new();
        let _first = backend.open_channel(13, 120.0).unwrap();
        assert!(matches!(
            backend.open_channel(13, 120.0),
            Err(HardwareError::PinUnavailable { pin: 13, .. })
        ));
    }

    #[test]
    fn test_injected_failures() {
        let mut backend = SimulatedBackend::new();
        let probe = backend.probe();
        probe.fail_open(15);
        probe.fail_write(16);

        assert!(backend.open_channel(15, 120.0).is_err());
        let mut channel = backend.open_channel(16, 120.0).unwrap();
        assert!(matches!(
            channel.set_duty_cycle(1.0),
            Err(HardwareError::Write { pin: 16, .. })
        ));
    }

    #[test]
    fn test_default_backend_keeps_no_history() {
        let mut backend = SimulatedBackend::new();
        let probe = backend.probe();
        let mut channel = backend.open_channel(11, 120.0).unwrap();

        for i in 0..10_000 {
            channel.set_duty_cycle((i % 100) as f32).unwrap();
        }

        let record = probe.channel(11).unwrap();
        assert!(record.history.is_empty());
        assert_eq!(record.duty_cycle, 99.0);
    }
}
