use std::sync::Arc;

use crate::models::device::DeviceInfo;
use crate::models::error::BridgeError;
use crate::models::format::AudioFormat;

/// One callback delivery of native-format frames.
///
/// Which variant a backend produces is fixed by the negotiated
/// [`AudioFormat::layout`] for the whole session.
#[derive(Debug, Clone, Copy)]
pub enum Frames<'a> {
    /// Channels alternate within one buffer: `[L0, R0, L1, R1, ...]`.
    Interleaved { samples: &'a [f32], channels: u16 },
    /// One contiguous buffer per channel, equal frame counts expected.
    Planar { channels: &'a [&'a [f32]] },
}

impl Frames<'_> {
    /// Number of audio frames (per-channel sample groups) in the delivery.
    pub fn frame_count(&self) -> usize {
        match self {
            Frames::Interleaved { samples, channels } => {
                samples.len() / (*channels).max(1) as usize
            }
            Frames::Planar { channels } => {
                channels.iter().map(|c| c.len()).min().unwrap_or(0)
            }
        }
    }
}

/// Callback invoked by the backend for every captured frame batch.
///
/// Fires on the backend's real-time audio thread: implementations must
/// stay short, must not block, and must fully consume the delivery before
/// returning.
pub type FrameCallback = Arc<dyn Fn(Frames<'_>) + Send + Sync + 'static>;

/// Interface for platform-specific audio input sources.
///
/// Implemented by `CpalBackend` (mic-bridge-cpal) for real hardware and by
/// [`ScriptedBackend`](crate::testing::ScriptedBackend) for deterministic
/// tests.
pub trait CaptureBackend: Send {
    /// Constant identifier for the capture backend in use.
    fn input_name(&self) -> &'static str;

    /// Whether a capture device is currently available.
    fn is_available(&self) -> bool;

    /// Acquire the device and negotiate `format`.
    ///
    /// Must be atomic: on error, nothing is left acquired or running.
    fn open(&mut self, format: &AudioFormat) -> Result<(), BridgeError>;

    /// Start production, delivering frames via `callback` until `stop`.
    fn start(&mut self, callback: FrameCallback) -> Result<(), BridgeError>;

    /// Stop production. No callback fires after this returns.
    fn stop(&mut self) -> Result<(), BridgeError>;

    /// Release the device acquired by `open`.
    fn close(&mut self) -> Result<(), BridgeError>;

    /// Information about the device backing this source.
    fn device_info(&self) -> DeviceInfo;
}
