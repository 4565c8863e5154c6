//! PWM hardware output
//!
//! The control loop only sees two small traits:
//!
//! - [`OutputBackend`] hands out one [`PwmChannel`] per pin and owns any
//!   process-wide hardware state (the GPIO block, pin numbering mode).
//! - [`PwmChannel`] accepts duty-cycle updates and can be stopped.
//!
//! Backends:
//! - **GpioBackend** (feature `gpio`, Linux): software PWM through `rppal`
//! - **SimulatedBackend**: records writes in memory, used for dry runs and tests

mod error;
mod pins;
mod simulated;

#[cfg(all(target_os = "linux", feature = "gpio"))]
mod gpio;

pub use error::{HardwareError, HardwareResult};
pub use pins::{board_to_bcm, PinNumbering};
pub use simulated::{ChannelRecord, SimulatedBackend, SimulatedChannel, SimulatedProbe};

#[cfg(all(target_os = "linux", feature = "gpio"))]
pub use gpio::{GpioBackend, GpioChannel};

/// A single pulse-width-modulated output
pub trait PwmChannel {
    /// Pin this channel drives, as configured
    fn pin(&self) -> u8;

    /// Set the duty cycle in percent (0.0 - 100.0)
    fn set_duty_cycle(&mut self, percent: f32) -> HardwareResult<()>;

    /// Drive the output to 0% and release the underlying handle
    ///
    /// Calling this more than once is a no-op.
    fn stop(&mut self) -> HardwareResult<()>;
}

/// Source of PWM channels, owner of global hardware state
pub trait OutputBackend {
    type Channel: PwmChannel;

    /// Configure `pin` as an output and start PWM at `frequency_hz` with 0% duty
    fn open_channel(&mut self, pin: u8, frequency_hz: f32) -> HardwareResult<Self::Channel>;

    /// Release process-wide hardware state
    ///
    /// Called once, after every channel has been stopped.
    fn release(&mut self) -> HardwareResult<()>;
}
