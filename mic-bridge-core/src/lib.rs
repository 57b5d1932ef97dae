//! # mic-bridge-core
//!
//! Platform-agnostic microphone capture bridge.
//!
//! Decouples a periodic, non-blocking hardware audio callback (producer)
//! from a blocking, demand-driven sample pull (consumer) so a speech
//! pipeline can read a fixed-format mono i16 stream at its own pace.
//! Platform backends implement the `CaptureBackend` trait and plug into
//! the generic `CaptureBridge`.
//!
//! ## Architecture
//!
//! ```text
//! mic-bridge-core (this crate)
//! ├── traits/       ← CaptureBackend, FrameCallback, Frames
//! ├── models/       ← BridgeError, BridgeState, AudioFormat, BridgeConfig, DeviceInfo
//! ├── processing/   ← sample conversion, SampleRing, SharedRing
//! ├── session/      ← CaptureBridge (generic orchestrator), BridgeReader
//! └── testing       ← ScriptedBackend (deterministic fake for tests)
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod testing;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::device::DeviceInfo;
pub use models::error::BridgeError;
pub use models::format::{AudioFormat, BridgeConfig, SampleEncoding, SampleLayout, DEFAULT_RING_CAPACITY};
pub use models::state::BridgeState;
pub use processing::ring_buffer::SampleRing;
pub use processing::shared_ring::SharedRing;
pub use session::bridge::{BridgeReader, CaptureBridge};
pub use testing::{ScriptHandle, ScriptedBackend};
pub use traits::capture_backend::{CaptureBackend, FrameCallback, Frames};
