use serde::{Deserialize, Serialize};

/// Default ring buffer capacity in samples.
pub const DEFAULT_RING_CAPACITY: usize = 4096;

/// How the backend encodes a single sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleEncoding {
    /// 32-bit floating point in nominal [-1.0, 1.0].
    Float,
    /// Signed fixed-point integer.
    Signed,
}

/// How the backend lays out multi-channel frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleLayout {
    /// Channels alternate within one buffer: `[L0, R0, L1, R1, ...]`.
    Interleaved,
    /// One contiguous buffer per channel.
    Planar,
}

/// Negotiated hardware audio format for one capture session.
///
/// Fixed for the lifetime of the session; changing any field requires a
/// full `end` / `standby` cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels delivered by the hardware.
    pub channels: u16,
    /// Bits per sample on the hardware side.
    pub bit_depth: u16,
    pub encoding: SampleEncoding,
    pub layout: SampleLayout,
}

impl AudioFormat {
    /// Speech-pipeline default: mono float32 at 16 kHz, interleaved.
    pub fn speech(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if !(1..=2).contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        match (self.encoding, self.bit_depth) {
            (SampleEncoding::Float, 32) => {}
            (SampleEncoding::Signed, 16) => {}
            (encoding, depth) => {
                return Err(format!("unsupported encoding: {:?} at {} bits", encoding, depth));
            }
        }
        Ok(())
    }
}

impl Default for AudioFormat {
    fn default() -> Self {
        Self {
            sample_rate: 16_000,
            channels: 1,
            bit_depth: 32,
            encoding: SampleEncoding::Float,
            layout: SampleLayout::Interleaved,
        }
    }
}

/// Configuration for a capture bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Format template; `standby` overrides the sample rate.
    pub format: AudioFormat,

    /// Ring buffer capacity in samples. Must absorb the scheduling jitter
    /// between producer callbacks and consumer reads; undersizing raises
    /// overrun frequency.
    pub ring_capacity: usize,

    /// Specific capture device ID, or None for the system default.
    pub device_id: Option<String>,
}

impl BridgeConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.ring_capacity == 0 {
            return Err("ring capacity must be positive".into());
        }
        self.format.validate()
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            format: AudioFormat::default(),
            ring_capacity: DEFAULT_RING_CAPACITY,
            device_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(BridgeConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_sample_rate_rejected() {
        let format = AudioFormat::speech(0);
        assert!(format.validate().is_err());
    }

    #[test]
    fn mismatched_encoding_depth_rejected() {
        let format = AudioFormat {
            encoding: SampleEncoding::Float,
            bit_depth: 16,
            ..AudioFormat::default()
        };
        assert!(format.validate().is_err());
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = BridgeConfig {
            ring_capacity: 0,
            ..BridgeConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
