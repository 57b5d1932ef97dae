//! Native-format to fixed-point sample conversion.
//!
//! The hardware side delivers f32 samples in nominal [-1.0, 1.0]; the
//! recognition pipeline consumes mono signed 16-bit. Conversion clamps
//! before scaling so headroom excursions from intermediate processing
//! saturate instead of wrapping, and multi-channel frames are downmixed
//! by averaging.
//!
//! All entry points write into a caller-provided buffer so the producer
//! callback does not allocate once its scratch buffer has capacity.

use crate::traits::capture_backend::Frames;

/// Convert one f32 sample to fixed-point, saturating at the extremes.
///
/// Scaling is linear by `i16::MAX`, so the saturated range is symmetric:
/// out-of-range input maps to `±i16::MAX`, never a wrapped value.
#[inline]
pub fn sample_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

/// Convert an interleaved frame batch to mono fixed-point samples.
///
/// `channels` is the interleave factor; each frame's channels are averaged
/// into one output sample. A trailing partial frame is dropped.
pub fn convert_interleaved(samples: &[f32], channels: u16, out: &mut Vec<i16>) {
    out.clear();
    let channels = channels.max(1) as usize;

    if channels == 1 {
        out.extend(samples.iter().map(|&s| sample_to_i16(s)));
        return;
    }

    for frame in samples.chunks_exact(channels) {
        let sum: f32 = frame.iter().sum();
        out.push(sample_to_i16(sum / channels as f32));
    }
}

/// Convert a planar frame batch (one slice per channel) to mono
/// fixed-point samples.
///
/// The frame count is the shortest channel length; channels are averaged
/// per frame.
pub fn convert_planar(channels: &[&[f32]], out: &mut Vec<i16>) {
    out.clear();
    if channels.is_empty() {
        return;
    }

    let frames = channels.iter().map(|c| c.len()).min().unwrap_or(0);
    let scale = 1.0 / channels.len() as f32;
    for i in 0..frames {
        let sum: f32 = channels.iter().map(|c| c[i]).sum();
        out.push(sample_to_i16(sum * scale));
    }
}

/// Convert one callback delivery in whichever layout the backend uses.
pub fn convert(frames: Frames<'_>, out: &mut Vec<i16>) {
    match frames {
        Frames::Interleaved { samples, channels } => convert_interleaved(samples, channels, out),
        Frames::Planar { channels } => convert_planar(channels, out),
    }
}
