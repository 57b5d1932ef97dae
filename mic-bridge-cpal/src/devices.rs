//! Input device enumeration through cpal's default host.

use cpal::traits::{DeviceTrait, HostTrait};

use mic_bridge_core::models::device::DeviceInfo;

/// List all available audio input devices.
///
/// Returns an empty list when enumeration fails or no devices exist;
/// failures are logged rather than surfaced since enumeration is advisory.
pub fn list_input_devices() -> Vec<DeviceInfo> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());

    let devices = match host.input_devices() {
        Ok(devices) => devices,
        Err(e) => {
            log::warn!("failed to enumerate input devices: {e}");
            return Vec::new();
        }
    };

    devices
        .enumerate()
        .map(|(idx, device)| {
            let name = device
                .name()
                .unwrap_or_else(|_| format!("Input Device {}", idx + 1));
            let is_default = default_name.as_deref() == Some(name.as_str());
            DeviceInfo {
                // cpal exposes no stable ID, so the name doubles as one.
                id: name.clone(),
                name,
                is_default,
            }
        })
        .collect()
}
