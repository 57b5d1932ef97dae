use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device::DeviceInfo;
use crate::models::error::BridgeError;
use crate::models::format::{AudioFormat, BridgeConfig};
use crate::models::state::BridgeState;
use crate::processing::converter;
use crate::processing::shared_ring::SharedRing;
use crate::traits::capture_backend::{CaptureBackend, FrameCallback, Frames};

/// Capture session bridging a platform audio backend to a pull-based
/// fixed-point sample stream.
///
/// Generic over the backend via the [`CaptureBackend`] trait; each bridge
/// owns exactly one session, so callers hold a bridge value instead of
/// relying on process-wide state, and independent bridges can coexist.
///
/// Data flow:
/// ```text
/// [Backend audio thread] → gate → convert → [SharedRing] → read()
/// ```
///
/// The producer callback converts each native frame batch to mono i16 and
/// pushes it into the ring without ever blocking; `read` is the only
/// operation that blocks, suspending while the ring is empty.
pub struct CaptureBridge<B: CaptureBackend> {
    backend: B,
    config: BridgeConfig,
    state: BridgeState,
    format: Option<AudioFormat>,

    // Shared with the producer callback while capture is live.
    ring: Option<Arc<SharedRing>>,
    gate: Arc<AtomicBool>,
}

impl<B: CaptureBackend> CaptureBridge<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            config: BridgeConfig::default(),
            state: BridgeState::Uninitialized,
            format: None,
            ring: None,
            gate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a bridge with a non-default ring capacity or format template.
    pub fn with_config(backend: B, config: BridgeConfig) -> Result<Self, BridgeError> {
        config.validate().map_err(BridgeError::ConfigurationFailed)?;
        Ok(Self {
            config,
            ..Self::new(backend)
        })
    }

    /// Acquire the capture device and negotiate the session format.
    ///
    /// Must succeed before any other operation. On failure nothing is left
    /// acquired and the bridge stays `Uninitialized`. Calling `standby`
    /// again without an intervening `end` releases the previous
    /// acquisition first rather than leaking it.
    pub fn standby(&mut self, sample_rate: u32) -> Result<(), BridgeError> {
        if self.state.is_acquired() {
            log::debug!("standby in {} state, releasing previous acquisition", self.state);
            self.teardown()?;
        }

        let format = AudioFormat {
            sample_rate,
            ..self.config.format
        };
        format.validate().map_err(BridgeError::ConfigurationFailed)?;

        if !self.backend.is_available() {
            return Err(BridgeError::DeviceNotAvailable);
        }
        self.backend.open(&format)?;

        self.ring = Some(Arc::new(SharedRing::new(self.config.ring_capacity)));
        self.format = Some(format);
        self.set_state(BridgeState::Standby);
        Ok(())
    }

    /// Start production: the backend begins invoking the producer callback
    /// on its audio thread.
    ///
    /// `path` exists for interface symmetry with file-based capture modes
    /// and is ignored for live input.
    pub fn begin(&mut self, path: Option<&Path>) -> Result<(), BridgeError> {
        if let Some(path) = path {
            log::debug!("begin: ignoring path {:?} for live capture", path);
        }
        match self.state {
            BridgeState::Standby => {}
            BridgeState::Running | BridgeState::Paused | BridgeState::Terminated => {
                return Err(BridgeError::AlreadyRunning);
            }
            state => {
                return Err(BridgeError::InvalidState {
                    operation: "begin",
                    state,
                });
            }
        }
        let Some(ring) = self.ring.clone() else {
            return Err(BridgeError::InvalidState {
                operation: "begin",
                state: self.state,
            });
        };

        self.gate.store(true, Ordering::SeqCst);
        let gate = Arc::clone(&self.gate);

        // Scratch buffer for converted samples, sized once so the callback
        // does not allocate per delivery. Single producer, so the lock is
        // uncontended.
        let scratch = Mutex::new(Vec::with_capacity(self.config.ring_capacity));

        let callback: FrameCallback = Arc::new(move |frames: Frames<'_>| {
            if !gate.load(Ordering::Relaxed) {
                // Paused or terminated: drop the delivery, never stall.
                return;
            }
            let mut converted = scratch.lock();
            converter::convert(frames, &mut converted);
            let lost = ring.push(&converted);
            if lost > 0 {
                log::warn!("capture overrun: {} unread samples overwritten", lost);
            }
        });

        if let Err(e) = self.backend.start(callback) {
            self.gate.store(false, Ordering::SeqCst);
            return Err(e);
        }
        self.set_state(BridgeState::Running);
        Ok(())
    }

    /// Stop capture and release every acquired resource.
    ///
    /// Wakes any reader blocked in `read` with [`BridgeError::Stopped`].
    /// A fresh `standby` afterwards reacquires from scratch.
    pub fn end(&mut self) -> Result<(), BridgeError> {
        if !self.state.is_acquired() {
            return Err(BridgeError::InvalidState {
                operation: "end",
                state: self.state,
            });
        }
        self.teardown()
    }

    /// Blocking pull of converted samples in production order.
    ///
    /// Suspends while no data is available and returns as soon as at least
    /// one sample exists, copying at most `dest.len()` samples. Returns
    /// [`BridgeError::Stopped`] once capture has been shut down.
    pub fn read(&self, dest: &mut [i16]) -> Result<usize, BridgeError> {
        match &self.ring {
            Some(ring) if self.state.is_readable() => ring.pop_blocking(dest),
            _ => Err(BridgeError::InvalidState {
                operation: "read",
                state: self.state,
            }),
        }
    }

    /// Detached read handle bound to this session's buffer.
    ///
    /// Lets a consumer thread block in reads while the owning thread keeps
    /// control of the lifecycle; a handle outliving the session observes
    /// [`BridgeError::Stopped`].
    pub fn reader(&self) -> Result<BridgeReader, BridgeError> {
        match &self.ring {
            Some(ring) if self.state.is_readable() => Ok(BridgeReader {
                ring: Arc::clone(ring),
            }),
            _ => Err(BridgeError::InvalidState {
                operation: "reader",
                state: self.state,
            }),
        }
    }

    /// Suspend production while preserving unread buffer contents.
    ///
    /// Buffered samples remain readable; new deliveries are dropped at the
    /// gate until `resume`.
    pub fn pause(&mut self) -> Result<(), BridgeError> {
        if !self.state.is_running() {
            return Err(BridgeError::InvalidState {
                operation: "pause",
                state: self.state,
            });
        }
        self.gate.store(false, Ordering::SeqCst);
        self.set_state(BridgeState::Paused);
        Ok(())
    }

    /// Halt production and discard unread buffer contents.
    ///
    /// A reader blocked in `read` wakes with [`BridgeError::Stopped`]
    /// instead of waiting for data that will never come.
    pub fn terminate(&mut self) -> Result<(), BridgeError> {
        if !self.state.is_readable() {
            return Err(BridgeError::InvalidState {
                operation: "terminate",
                state: self.state,
            });
        }
        self.gate.store(false, Ordering::SeqCst);
        if let Some(ring) = &self.ring {
            ring.clear();
            ring.close();
        }
        self.set_state(BridgeState::Terminated);
        Ok(())
    }

    /// Re-enter `Running` from `Paused` or `Terminated`.
    pub fn resume(&mut self) -> Result<(), BridgeError> {
        if !matches!(self.state, BridgeState::Paused | BridgeState::Terminated) {
            return Err(BridgeError::InvalidState {
                operation: "resume",
                state: self.state,
            });
        }
        if let Some(ring) = &self.ring {
            ring.reopen();
        }
        self.gate.store(true, Ordering::SeqCst);
        self.set_state(BridgeState::Running);
        Ok(())
    }

    /// Constant identifier of the capture backend in use.
    pub fn input_name(&self) -> &'static str {
        self.backend.input_name()
    }

    /// Device behind the current backend.
    pub fn device_info(&self) -> DeviceInfo {
        self.backend.device_info()
    }

    pub fn state(&self) -> BridgeState {
        self.state
    }

    /// Format negotiated by the last successful `standby`.
    pub fn format(&self) -> Option<AudioFormat> {
        self.format
    }

    /// Unread samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.ring.as_ref().map_or(0, |r| r.len())
    }

    /// Samples lost to overrun in this session.
    pub fn lost_samples(&self) -> u64 {
        self.ring.as_ref().map_or(0, |r| r.lost_samples())
    }

    fn set_state(&mut self, new_state: BridgeState) {
        log::debug!("capture state {} -> {}", self.state, new_state);
        self.state = new_state;
    }

    /// Stop production if live, wake blocked readers, release the device.
    fn teardown(&mut self) -> Result<(), BridgeError> {
        self.gate.store(false, Ordering::SeqCst);
        if matches!(
            self.state,
            BridgeState::Running | BridgeState::Paused | BridgeState::Terminated
        ) {
            self.backend.stop()?;
        }
        if let Some(ring) = &self.ring {
            ring.close();
        }
        self.backend.close()?;
        self.ring = None;
        self.format = None;
        self.set_state(BridgeState::Uninitialized);
        Ok(())
    }
}

/// Consumer-side read handle detached from the bridge's lifecycle calls.
pub struct BridgeReader {
    ring: Arc<SharedRing>,
}

impl BridgeReader {
    /// Same contract as [`CaptureBridge::read`].
    pub fn read(&self, dest: &mut [i16]) -> Result<usize, BridgeError> {
        self.ring.pop_blocking(dest)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::models::format::SampleLayout;
    use crate::processing::converter::sample_to_i16;
    use crate::testing::ScriptedBackend;

    fn running_bridge() -> (CaptureBridge<ScriptedBackend>, crate::testing::ScriptHandle) {
        let (backend, handle) = ScriptedBackend::new();
        let mut bridge = CaptureBridge::new(backend);
        bridge.standby(16_000).unwrap();
        bridge.begin(None).unwrap();
        (bridge, handle)
    }

    #[test]
    fn operations_before_standby_are_rejected() {
        let (backend, handle) = ScriptedBackend::new();
        let mut bridge = CaptureBridge::new(backend);

        let mut out = [0i16; 4];
        assert!(matches!(
            bridge.read(&mut out),
            Err(BridgeError::InvalidState { operation: "read", .. })
        ));
        assert!(bridge.begin(None).is_err());
        assert!(bridge.pause().is_err());
        assert!(bridge.resume().is_err());
        assert!(bridge.terminate().is_err());
        assert!(bridge.end().is_err());

        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        assert_eq!(handle.open_count(), 0);
    }

    #[test]
    fn standby_failure_leaves_nothing_acquired() {
        let (backend, handle) = ScriptedBackend::new();
        handle.fail_next_open();
        let mut bridge = CaptureBridge::new(backend);

        assert!(bridge.standby(16_000).is_err());
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        assert!(!handle.is_open());
        assert!(bridge.format().is_none());
    }

    #[test]
    fn standby_rejects_unavailable_device() {
        let (backend, handle) = ScriptedBackend::new();
        handle.set_available(false);
        let mut bridge = CaptureBridge::new(backend);

        assert_eq!(bridge.standby(16_000), Err(BridgeError::DeviceNotAvailable));
        assert_eq!(handle.open_count(), 0);
    }

    #[test]
    fn double_standby_releases_previous_acquisition() {
        let (backend, handle) = ScriptedBackend::new();
        let mut bridge = CaptureBridge::new(backend);

        bridge.standby(16_000).unwrap();
        bridge.standby(44_100).unwrap();

        assert_eq!(handle.open_count(), 2);
        assert_eq!(handle.close_count(), 1);
        assert_eq!(bridge.format().map(|f| f.sample_rate), Some(44_100));
        assert_eq!(bridge.state(), BridgeState::Standby);
    }

    #[test]
    fn begin_read_end_round_trip() {
        let (mut bridge, handle) = running_bridge();
        assert!(handle.is_streaming());

        assert!(handle.emit_interleaved(&[0.0, 0.5, -0.5], 1));

        let mut out = [0i16; 8];
        let n = bridge.read(&mut out).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&out[..3], &[0, sample_to_i16(0.5), sample_to_i16(-0.5)]);

        bridge.end().unwrap();
        assert_eq!(bridge.state(), BridgeState::Uninitialized);
        assert!(!handle.is_streaming());
        assert!(!handle.is_open());
    }

    #[test]
    fn begin_twice_is_already_running() {
        let (mut bridge, _handle) = running_bridge();
        assert_eq!(bridge.begin(None), Err(BridgeError::AlreadyRunning));
    }

    #[test]
    fn stereo_input_is_downmixed() {
        let (bridge, handle) = running_bridge();
        handle.emit_interleaved(&[1.0, 0.0, -1.0, -1.0], 2);

        let mut out = [0i16; 4];
        let n = bridge.read(&mut out).unwrap();
        assert_eq!(n, 2);
        assert_eq!(&out[..2], &[sample_to_i16(0.5), -i16::MAX]);
    }

    #[test]
    fn planar_input_is_downmixed() {
        let (backend, handle) = ScriptedBackend::new();
        let mut bridge = CaptureBridge::with_config(
            backend,
            BridgeConfig {
                format: AudioFormat {
                    channels: 2,
                    layout: SampleLayout::Planar,
                    ..AudioFormat::default()
                },
                ..BridgeConfig::default()
            },
        )
        .unwrap();
        bridge.standby(16_000).unwrap();
        bridge.begin(None).unwrap();

        handle.emit_planar(&[&[1.0, 0.0], &[0.0, 0.0]]);

        let mut out = [0i16; 4];
        assert_eq!(bridge.read(&mut out), Ok(2));
        assert_eq!(&out[..2], &[sample_to_i16(0.5), 0]);
    }

    #[test]
    fn pause_preserves_buffered_data_and_gates_production() {
        let (mut bridge, handle) = running_bridge();
        handle.emit_interleaved(&[0.25; 4], 1);

        bridge.pause().unwrap();
        assert_eq!(bridge.state(), BridgeState::Paused);

        // Production while paused is dropped at the gate.
        handle.emit_interleaved(&[0.75; 4], 1);
        assert_eq!(bridge.buffered(), 4);

        let mut out = [0i16; 8];
        assert_eq!(bridge.read(&mut out), Ok(4));
        assert_eq!(out[0], sample_to_i16(0.25));
    }

    #[test]
    fn terminate_discards_buffered_data() {
        let (mut bridge, handle) = running_bridge();
        handle.emit_interleaved(&[0.5; 8], 1);

        bridge.terminate().unwrap();
        assert_eq!(bridge.state(), BridgeState::Terminated);
        assert_eq!(bridge.buffered(), 0);

        // Reads are refused rather than blocking forever.
        let mut out = [0i16; 4];
        assert!(bridge.read(&mut out).is_err());
    }

    #[test]
    fn terminate_wakes_blocked_reader() {
        let (mut bridge, _handle) = running_bridge();
        let reader = bridge.reader().unwrap();

        let consumer = thread::spawn(move || {
            let mut out = [0i16; 16];
            reader.read(&mut out)
        });

        thread::sleep(Duration::from_millis(50));
        bridge.terminate().unwrap();

        assert_eq!(consumer.join().unwrap(), Err(BridgeError::Stopped));
    }

    #[test]
    fn end_wakes_blocked_reader() {
        let (mut bridge, _handle) = running_bridge();
        let reader = bridge.reader().unwrap();

        let consumer = thread::spawn(move || {
            let mut out = [0i16; 16];
            reader.read(&mut out)
        });

        thread::sleep(Duration::from_millis(50));
        bridge.end().unwrap();

        assert_eq!(consumer.join().unwrap(), Err(BridgeError::Stopped));
    }

    #[test]
    fn resume_after_pause_restarts_production() {
        let (mut bridge, handle) = running_bridge();
        bridge.pause().unwrap();
        bridge.resume().unwrap();
        assert_eq!(bridge.state(), BridgeState::Running);

        handle.emit_interleaved(&[0.5, 0.5], 1);
        let mut out = [0i16; 4];
        assert_eq!(bridge.read(&mut out), Ok(2));
    }

    #[test]
    fn resume_after_terminate_restarts_with_empty_buffer() {
        let (mut bridge, handle) = running_bridge();
        handle.emit_interleaved(&[0.5; 8], 1);

        bridge.terminate().unwrap();
        bridge.resume().unwrap();
        assert_eq!(bridge.buffered(), 0);

        handle.emit_interleaved(&[0.25, 0.25], 1);
        let mut out = [0i16; 4];
        assert_eq!(bridge.read(&mut out), Ok(2));
        assert_eq!(out[0], sample_to_i16(0.25));
    }

    #[test]
    fn overrun_is_counted_and_stream_continues() {
        let (backend, handle) = ScriptedBackend::new();
        let mut bridge = CaptureBridge::with_config(
            backend,
            BridgeConfig {
                ring_capacity: 16,
                ..BridgeConfig::default()
            },
        )
        .unwrap();
        bridge.standby(16_000).unwrap();
        bridge.begin(None).unwrap();

        handle.emit_interleaved(&[0.1; 24], 1);
        assert_eq!(bridge.lost_samples(), 8);
        assert_eq!(bridge.buffered(), 16);

        let mut out = [0i16; 16];
        assert_eq!(bridge.read(&mut out), Ok(16));
    }

    #[test]
    fn input_name_reports_backend() {
        let (backend, _handle) = ScriptedBackend::new();
        let bridge = CaptureBridge::new(backend);
        assert_eq!(bridge.input_name(), "scripted");
    }
}
