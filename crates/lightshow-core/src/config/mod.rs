//! Configuration for the light show
//!
//! This module provides:
//!
//! - `ShowConfig`, the immutable tunables handed to every component at construction
//! - Generic YAML config loading
//! - The default config file location
//!
//! # Usage
//!
//! ```ignore
//! use lightshow_core::config::{default_config_path, load_config, ShowConfig};
//!
//! let config: ShowConfig = load_config(&default_config_path());
//! config.validate()?;
//! ```

mod io;
mod paths;
mod show;

pub use io::load_config;
pub use paths::{default_config_dir, default_config_path, CONFIG_FILE_NAME};
pub use show::{
    CaptureConfig, ChannelConfig, ConfigError, FixtureConfig, LoudnessConfig, RgbPins, ShowConfig,
};
