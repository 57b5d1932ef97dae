//! Deterministic in-memory backend for tests.
//!
//! [`ScriptedBackend`] implements [`CaptureBackend`] with no hardware:
//! the paired [`ScriptHandle`] synthesizes frame deliveries synchronously,
//! so tests control exactly when and what the producer side pushes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device::DeviceInfo;
use crate::models::error::BridgeError;
use crate::models::format::AudioFormat;
use crate::traits::capture_backend::{CaptureBackend, FrameCallback, Frames};

#[derive(Default)]
struct ScriptState {
    callback: Mutex<Option<FrameCallback>>,
    format: Mutex<Option<AudioFormat>>,
    open_count: AtomicUsize,
    close_count: AtomicUsize,
    opened: AtomicBool,
    streaming: AtomicBool,
    fail_next_open: AtomicBool,
    unavailable: AtomicBool,
}

/// Scripted capture backend. Obtain via [`ScriptedBackend::new`], which
/// also returns the driving handle.
pub struct ScriptedBackend {
    state: Arc<ScriptState>,
}

/// Test-side driver for a [`ScriptedBackend`].
#[derive(Clone)]
pub struct ScriptHandle {
    state: Arc<ScriptState>,
}

impl ScriptedBackend {
    pub fn new() -> (Self, ScriptHandle) {
        let state = Arc::new(ScriptState::default());
        (
            Self {
                state: Arc::clone(&state),
            },
            ScriptHandle { state },
        )
    }
}

impl CaptureBackend for ScriptedBackend {
    fn input_name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        !self.state.unavailable.load(Ordering::SeqCst)
    }

    fn open(&mut self, format: &AudioFormat) -> Result<(), BridgeError> {
        if self.state.fail_next_open.swap(false, Ordering::SeqCst) {
            return Err(BridgeError::DeviceNotAvailable);
        }
        if self.state.opened.load(Ordering::SeqCst) {
            return Err(BridgeError::ConfigurationFailed("already open".into()));
        }
        *self.state.format.lock() = Some(*format);
        self.state.opened.store(true, Ordering::SeqCst);
        self.state.open_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), BridgeError> {
        if !self.state.opened.load(Ordering::SeqCst) {
            return Err(BridgeError::ConfigurationFailed("not open".into()));
        }
        if self.state.streaming.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::AlreadyRunning);
        }
        *self.state.callback.lock() = Some(callback);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.state.streaming.store(false, Ordering::SeqCst);
        *self.state.callback.lock() = None;
        Ok(())
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        if self.state.opened.swap(false, Ordering::SeqCst) {
            self.state.close_count.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        DeviceInfo {
            id: "scripted-0".into(),
            name: "Scripted Test Input".into(),
            is_default: true,
        }
    }
}

impl ScriptHandle {
    /// Deliver one interleaved frame batch to the registered callback.
    ///
    /// Returns false when no callback is registered (capture not running).
    pub fn emit_interleaved(&self, samples: &[f32], channels: u16) -> bool {
        let cb = self.state.callback.lock().clone();
        match cb {
            Some(cb) => {
                cb(Frames::Interleaved { samples, channels });
                true
            }
            None => false,
        }
    }

    /// Deliver one planar frame batch to the registered callback.
    pub fn emit_planar(&self, channels: &[&[f32]]) -> bool {
        let cb = self.state.callback.lock().clone();
        match cb {
            Some(cb) => {
                cb(Frames::Planar { channels });
                true
            }
            None => false,
        }
    }

    /// Make the next `open` fail without acquiring anything.
    pub fn fail_next_open(&self) {
        self.state.fail_next_open.store(true, Ordering::SeqCst);
    }

    /// Toggle device availability.
    pub fn set_available(&self, available: bool) {
        self.state.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Format negotiated by the last `open`.
    pub fn format(&self) -> Option<AudioFormat> {
        *self.state.format.lock()
    }

    pub fn is_open(&self) -> bool {
        self.state.opened.load(Ordering::SeqCst)
    }

    pub fn is_streaming(&self) -> bool {
        self.state.streaming.load(Ordering::SeqCst)
    }

    pub fn open_count(&self) -> usize {
        self.state.open_count.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.state.close_count.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_without_start_reports_no_listener() {
        let (mut backend, handle) = ScriptedBackend::new();
        assert!(!handle.emit_interleaved(&[0.0], 1));

        backend.open(&AudioFormat::default()).unwrap();
        assert!(!handle.emit_interleaved(&[0.0], 1));

        backend.start(Arc::new(|_frames| {})).unwrap();
        assert!(handle.emit_interleaved(&[0.0], 1));

        backend.stop().unwrap();
        assert!(!handle.emit_interleaved(&[0.0], 1));
    }

    #[test]
    fn start_requires_open() {
        let (mut backend, _handle) = ScriptedBackend::new();
        assert!(backend.start(Arc::new(|_frames| {})).is_err());
    }
}
