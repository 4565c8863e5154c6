//! Lightshow Core - audio-reactive control loop for two RGB fixtures
//!
//! Microphone samples become a loudness value, loudness becomes brightness,
//! and each fixture cycles its hue over wall-clock time. Six smoothed color
//! channels are written to PWM outputs every frame.
//!
//! # Architecture
//!
//! ```text
//! cpal callback → rtrb ring buffer → CaptureStream::read()
//!                                          │
//!                                          ▼
//!            LoudnessTransform → HueCycler ×2 → hsv_to_rgb → Fixture ×2
//!                                                               │
//!                                              ChannelFilter ×6 → PwmChannel
//! ```
//!
//! Everything right of the ring buffer runs on a single thread. The audio
//! read is the only blocking point and paces the loop.

pub mod audio;
pub mod channel;
pub mod config;
pub mod control;
pub mod error;
pub mod fixture;
pub mod hardware;
pub mod hue;
pub mod loudness;
pub mod types;

pub use error::{LightShowError, LightShowResult};
pub use types::*;
