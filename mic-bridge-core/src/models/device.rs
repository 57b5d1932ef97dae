use serde::{Deserialize, Serialize};

/// An audio input device available for capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Backend-specific stable identifier.
    pub id: String,
    /// Human-readable device name reported by the OS.
    pub name: String,
    /// Whether this is the system default input device.
    pub is_default: bool,
}

impl DeviceInfo {
    pub fn default_input(name: impl Into<String>) -> Self {
        Self {
            id: "default-input".into(),
            name: name.into(),
            is_default: true,
        }
    }
}
