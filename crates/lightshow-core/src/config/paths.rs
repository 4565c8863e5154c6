//! Path utilities for lightshow configuration files

use std::path::PathBuf;

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Get the default config directory
///
/// Returns: `$XDG_CONFIG_HOME/lightshow` (usually `~/.config/lightshow`)
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("lightshow")
}

/// Get the default config file path
///
/// Returns: `~/.config/lightshow/config.yaml`
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_dir_ends_with_lightshow() {
        assert!(default_config_dir().ends_with("lightshow"));
    }

    #[test]
    fn test_config_path_includes_filename() {
        assert!(default_config_path().ends_with("lightshow/config.yaml"));
    }
}
