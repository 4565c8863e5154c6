//! Top-level error type

use thiserror::Error;

use crate::audio::AudioError;
use crate::config::ConfigError;
use crate::hardware::HardwareError;

/// Anything that can stop the light show
#[derive(Error, Debug)]
pub enum LightShowError {
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    #[error("Hardware error: {0}")]
    Hardware(#[from] HardwareError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// One or more outputs could not be stopped during shutdown
    #[error("Cleanup failed: {}", describe_all(.0))]
    Cleanup(Vec<HardwareError>),
}

fn describe_all(errors: &[HardwareError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for light show operations
pub type LightShowResult<T> = Result<T, LightShowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleanup_lists_every_failure() {
        let err = LightShowError::Cleanup(vec![
            HardwareError::Released { pin: 11 },
            HardwareError::InvalidPin(99),
        ]);
        let message = err.to_string();
        assert!(message.starts_with("Cleanup failed: "));
        assert!(message.contains("11"));
        assert!(message.contains("99"));
        assert!(message.contains("; "));
    }
}
