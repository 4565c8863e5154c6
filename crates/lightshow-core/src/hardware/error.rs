//! Hardware output error types

use thiserror::Error;

/// Errors that can occur while driving PWM outputs
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HardwareError {
    /// The GPIO peripheral could not be opened
    #[error("Failed to initialize GPIO: {0}")]
    Init(String),

    /// Pin number does not name a usable GPIO line
    #[error("Pin {0} is not a GPIO pin")]
    InvalidPin(u8),

    /// Pin exists but could not be claimed (already in use, permissions)
    #[error("Pin {pin} is unavailable: {reason}")]
    PinUnavailable { pin: u8, reason: String },

    /// Duty cycle update failed
    #[error("Failed to set duty cycle on pin {pin}: {reason}")]
    Write { pin: u8, reason: String },

    /// Stopping the PWM output failed
    #[error("Failed to stop PWM on pin {pin}: {reason}")]
    Stop { pin: u8, reason: String },

    /// The channel was already stopped and its handle released
    #[error("Pin {pin} was used after its PWM output was released")]
    Released { pin: u8 },
}

/// Result type for hardware operations
pub type HardwareResult<T> = Result<T, HardwareError>;
