//! Audio capture error types

use thiserror::Error;

/// Errors that can occur while opening audio capture
#[derive(Error, Debug)]
pub enum AudioError {
    /// No audio devices available
    #[error("No audio input devices found")]
    NoDevices,

    /// Device not found
    #[error("Audio device not found: {0}")]
    DeviceNotFound(String),

    /// Neither the requested device nor any probed device could be opened
    #[error("{}", unavailable_message(.requested))]
    DeviceUnavailable {
        /// Device named on the command line, `None` when probing all devices
        requested: Option<String>,
        /// Identifiers of every capture device found
        available: Vec<String>,
    },

    /// Failed to get device configuration
    #[error("Failed to get device config: {0}")]
    ConfigError(String),

    /// Device cannot deliver a usable sample format at the capture rate
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// Failed to build audio stream
    #[error("Failed to build audio stream: {0}")]
    StreamBuildError(String),

    /// Failed to start stream
    #[error("Failed to start audio stream: {0}")]
    StreamPlayError(String),
}

fn unavailable_message(requested: &Option<String>) -> String {
    match requested {
        Some(_) => "Given device could not be initialized. Exiting.".to_string(),
        None => "No suitable device found. Exiting.".to_string(),
    }
}

/// Result type for audio operations
pub type AudioResult<T> = Result<T, AudioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_named_device_message() {
        let err = AudioError::DeviceUnavailable {
            requested: Some("hw:1".to_string()),
            available: vec!["default".to_string()],
        };
        assert_eq!(err.to_string(), "Given device could not be initialized. Exiting.");
    }

    #[test]
    fn test_unavailable_probe_message() {
        let err = AudioError::DeviceUnavailable {
            requested: None,
            available: Vec::new(),
        };
        assert_eq!(err.to_string(), "No suitable device found. Exiting.");
    }
}
