//! Audio capture for the control loop
//!
//! Opens a microphone through CPAL at 8kHz mono and hands the control loop
//! whatever samples arrived since its last read.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐  push()   ┌─────────────────────┐
//! │ CPAL capture cb  │──────────►│  Sample ring buffer │
//! │ (audio thread)   │           │  (lock-free SPSC)   │
//! └────────┬─────────┘           └──────────┬──────────┘
//!          │ try_send(())                   │ drain
//!          ▼                                ▼
//! ┌──────────────────┐  recv_timeout ┌─────────────────────┐
//! │  Ready channel   │──────────────►│    Control loop     │
//! │  (bounded, 1)    │               │  CaptureStream::read│
//! └──────────────────┘               └─────────────────────┘
//! ```
//!
//! The callback never blocks or allocates. The loop blocks on the ready
//! channel, so loop cadence equals the device's buffer delivery rate.

mod capture;
mod device;
mod error;

pub use capture::{open_capture, open_input, CaptureStream};
pub use device::{
    find_input_device, get_input_devices, input_device_names, probe_devices, InputDevice,
};
pub use error::{AudioError, AudioResult};
