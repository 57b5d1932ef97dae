//! cpal microphone backend.
//!
//! Opens an input device through cpal's default host and delivers f32
//! interleaved frames via the `FrameCallback`. The cpal stream is not
//! `Send`, so it lives on a dedicated capture thread for the duration of
//! production; `stop` flags the thread down and joins it, which drops the
//! stream and guarantees no callback fires afterwards.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use mic_bridge_core::models::device::DeviceInfo;
use mic_bridge_core::models::error::BridgeError;
use mic_bridge_core::models::format::{AudioFormat, SampleEncoding, SampleLayout};
use mic_bridge_core::traits::capture_backend::{CaptureBackend, FrameCallback, Frames};

/// Microphone capture via cpal.
///
/// Acquisition happens in `open`: the device is resolved and the requested
/// sample rate is validated against its supported input configurations.
/// No resampling is performed; an unsupported rate is a hard
/// `UnsupportedFormat` error, and the caller renegotiates with a fresh
/// `standby`.
pub struct CpalBackend {
    preferred_device: Option<String>,
    device: Option<cpal::Device>,
    stream_config: Option<cpal::StreamConfig>,
    running: Arc<AtomicBool>,
    capture_handle: Option<thread::JoinHandle<()>>,
}

impl CpalBackend {
    /// Capture from the system default input device.
    pub fn default_device() -> Self {
        Self {
            preferred_device: None,
            device: None,
            stream_config: None,
            running: Arc::new(AtomicBool::new(false)),
            capture_handle: None,
        }
    }

    /// Capture from a specific input device by name.
    pub fn with_device(name: impl Into<String>) -> Self {
        Self {
            preferred_device: Some(name.into()),
            ..Self::default_device()
        }
    }

    fn resolve_device(&self) -> Result<cpal::Device, BridgeError> {
        let host = cpal::default_host();
        match &self.preferred_device {
            Some(name) => {
                let mut devices = host
                    .input_devices()
                    .map_err(|e| BridgeError::BackendFailed(format!("device enumeration: {e}")))?;
                devices
                    .find(|d| d.name().map(|n| &n == name).unwrap_or(false))
                    .ok_or(BridgeError::DeviceNotAvailable)
            }
            None => host
                .default_input_device()
                .ok_or(BridgeError::DeviceNotAvailable),
        }
    }

    /// Pick an f32 input configuration supporting `format.sample_rate`,
    /// preferring the requested channel count, else the fewest channels.
    fn negotiate_config(
        device: &cpal::Device,
        format: &AudioFormat,
    ) -> Result<cpal::StreamConfig, BridgeError> {
        let rate = cpal::SampleRate(format.sample_rate);
        let supported = device
            .supported_input_configs()
            .map_err(|e| BridgeError::BackendFailed(format!("query input configs: {e}")))?;

        let mut candidates: Vec<_> = supported
            .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
            .filter(|c| c.min_sample_rate() <= rate && rate <= c.max_sample_rate())
            .collect();
        candidates.sort_by_key(|c| {
            (c.channels() != format.channels, c.channels())
        });

        let chosen = candidates.into_iter().next().ok_or_else(|| {
            BridgeError::UnsupportedFormat(format!(
                "device does not support {} Hz f32 input",
                format.sample_rate
            ))
        })?;

        Ok(cpal::StreamConfig {
            channels: chosen.channels(),
            sample_rate: rate,
            buffer_size: cpal::BufferSize::Default,
        })
    }
}

impl CaptureBackend for CpalBackend {
    fn input_name(&self) -> &'static str {
        "cpal"
    }

    fn is_available(&self) -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    fn open(&mut self, format: &AudioFormat) -> Result<(), BridgeError> {
        if self.device.is_some() {
            return Err(BridgeError::ConfigurationFailed("device already open".into()));
        }
        if format.layout != SampleLayout::Interleaved {
            return Err(BridgeError::UnsupportedFormat(
                "cpal delivers interleaved frames only".into(),
            ));
        }
        if format.encoding != SampleEncoding::Float {
            return Err(BridgeError::UnsupportedFormat(
                "cpal backend captures float32 input".into(),
            ));
        }

        let device = self.resolve_device()?;
        let config = Self::negotiate_config(&device, format)?;
        log::debug!(
            "opened input device {:?} at {} Hz, {} channel(s)",
            device.name().unwrap_or_else(|_| "<unnamed>".into()),
            config.sample_rate.0,
            config.channels
        );

        self.device = Some(device);
        self.stream_config = Some(config);
        Ok(())
    }

    fn start(&mut self, callback: FrameCallback) -> Result<(), BridgeError> {
        let device = self
            .device
            .clone()
            .ok_or_else(|| BridgeError::ConfigurationFailed("device not open".into()))?;
        let config = self
            .stream_config
            .clone()
            .ok_or_else(|| BridgeError::ConfigurationFailed("device not open".into()))?;

        if self.running.swap(true, Ordering::SeqCst) {
            return Err(BridgeError::AlreadyRunning);
        }

        let running = Arc::clone(&self.running);
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), BridgeError>>();

        let handle = thread::Builder::new()
            .name("cpal-capture".into())
            .spawn(move || {
                let channels = config.channels;
                let data_callback = move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    callback(Frames::Interleaved {
                        samples: data,
                        channels,
                    });
                };
                let error_callback = |e: cpal::StreamError| {
                    log::error!("input stream error: {e}");
                };

                let stream =
                    match device.build_input_stream(&config, data_callback, error_callback, None) {
                        Ok(s) => s,
                        Err(e) => {
                            let _ = ready_tx
                                .send(Err(BridgeError::BackendFailed(format!("build stream: {e}"))));
                            return;
                        }
                    };
                if let Err(e) = stream.play() {
                    let _ = ready_tx
                        .send(Err(BridgeError::BackendFailed(format!("start stream: {e}"))));
                    return;
                }
                let _ = ready_tx.send(Ok(()));

                // The stream produces on cpal's own audio thread; this
                // thread just keeps it alive until stop.
                while running.load(Ordering::SeqCst) {
                    thread::sleep(Duration::from_millis(20));
                }
                drop(stream);
            })
            .map_err(|e| BridgeError::BackendFailed(format!("spawn capture thread: {e}")))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.capture_handle = Some(handle);
                Ok(())
            }
            Ok(Err(e)) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                self.running.store(false, Ordering::SeqCst);
                let _ = handle.join();
                Err(BridgeError::BackendFailed("capture thread exited early".into()))
            }
        }
    }

    fn stop(&mut self) -> Result<(), BridgeError> {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.capture_handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), BridgeError> {
        self.stop()?;
        self.device = None;
        self.stream_config = None;
        Ok(())
    }

    fn device_info(&self) -> DeviceInfo {
        let name = self
            .device
            .as_ref()
            .and_then(|d| d.name().ok())
            .or_else(|| self.preferred_device.clone())
            .unwrap_or_else(|| "Default Input".into());
        DeviceInfo {
            id: name.clone(),
            name,
            is_default: self.preferred_device.is_none(),
        }
    }
}
