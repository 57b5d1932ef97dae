//! # mic-bridge-cpal
//!
//! cpal microphone backend for mic-bridge.
//!
//! Provides:
//! - `CpalBackend` — microphone capture implementing `CaptureBackend`
//!   over a cpal input stream
//! - `devices` — input device enumeration
//!
//! ## Usage
//! ```ignore
//! use mic_bridge_core::CaptureBridge;
//! use mic_bridge_cpal::CpalBackend;
//!
//! let mut bridge = CaptureBridge::new(CpalBackend::default_device());
//! bridge.standby(16_000)?;
//! bridge.begin(None)?;
//! let mut buf = [0i16; 1024];
//! let n = bridge.read(&mut buf)?;
//! ```

pub mod backend;
pub mod devices;

pub use backend::CpalBackend;
pub use devices::list_input_devices;
