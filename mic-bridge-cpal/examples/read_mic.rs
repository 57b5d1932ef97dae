//! Read three seconds of microphone audio through the capture bridge and
//! report stream statistics.
//!
//! Run with `cargo run --example read_mic`.

use std::time::{Duration, Instant};

use mic_bridge_core::CaptureBridge;
use mic_bridge_cpal::{list_input_devices, CpalBackend};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    for device in list_input_devices() {
        println!(
            "input device: {}{}",
            device.name,
            if device.is_default { " (default)" } else { "" }
        );
    }

    let mut bridge = CaptureBridge::new(CpalBackend::default_device());
    bridge.standby(16_000)?;
    bridge.begin(None)?;
    println!("capturing from {} via {}", bridge.device_info().name, bridge.input_name());

    let mut buf = [0i16; 1024];
    let mut total = 0usize;
    let mut peak = 0i16;
    let start = Instant::now();

    while start.elapsed() < Duration::from_secs(3) {
        let n = bridge.read(&mut buf)?;
        total += n;
        for &s in &buf[..n] {
            peak = peak.max(s.saturating_abs());
        }
    }

    let lost = bridge.lost_samples();
    bridge.end()?;

    println!("read {total} samples, peak amplitude {peak}, {lost} lost to overrun");
    Ok(())
}
