//! Configuration file loading
//!
//! Generic YAML loading that works with any deserializable config type.

use serde::de::DeserializeOwned;
use std::path::Path;

/// Load configuration from a YAML file
///
/// If the file doesn't exist, returns default config.
/// If the file exists but is invalid, logs a warning and returns default config.
///
/// Range checks are not done here; callers validate the result.
pub fn load_config<T>(path: &Path) -> T
where
    T: DeserializeOwned + Default,
{
    log::info!("load_config: Loading from {:?}", path);

    if !path.exists() {
        log::info!("load_config: Config file doesn't exist, using defaults");
        return T::default();
    }

    match std::fs::read_to_string(path) {
        Ok(contents) => match serde_yaml::from_str::<T>(&contents) {
            Ok(config) => {
                log::info!("load_config: Successfully loaded config from {:?}", path);
                config
            }
            Err(e) => {
                log::warn!("load_config: Failed to parse config: {}, using defaults", e);
                T::default()
            }
        },
        Err(e) => {
            log::warn!(
                "load_config: Failed to read config file: {}, using defaults",
                e
            );
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShowConfig;

    #[test]
    fn test_load_nonexistent_returns_default() {
        let config: ShowConfig = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert_eq!(config, ShowConfig::default());
    }

    #[test]
    fn test_partial_file_overrides_only_given_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(
            &path,
            "pwm_frequency_hz: 200.0\nloudness:\n  multiplier: 30.0\n  noise_gate: 0.01\n",
        )
        .unwrap();

        let config: ShowConfig = load_config(&path);
        let defaults = ShowConfig::default();

        assert_eq!(config.pwm_frequency_hz, 200.0);
        assert_eq!(config.loudness.multiplier, 30.0);
        assert_eq!(config.loudness.noise_gate, Some(0.01));
        // Untouched fields keep their defaults
        assert_eq!(config.loudness.exponent, defaults.loudness.exponent);
        assert_eq!(config.channel, defaults.channel);
        assert_eq!(config.fixtures, defaults.fixtures);
    }

    #[test]
    fn test_garbage_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "fixtures: [this is not, a fixture list").unwrap();

        let config: ShowConfig = load_config(&path);
        assert_eq!(config, ShowConfig::default());
    }
}
