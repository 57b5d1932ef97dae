use thiserror::Error;

use super::state::BridgeState;

/// Errors that can occur during capture bridge operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    #[error("no capture device available")]
    DeviceNotAvailable,

    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("backend failure: {0}")]
    BackendFailed(String),

    #[error("{operation} is not valid in the {state} state")]
    InvalidState {
        operation: &'static str,
        state: BridgeState,
    },

    #[error("capture is already running")]
    AlreadyRunning,

    /// Sentinel returned by a blocked `read` once capture has been shut
    /// down. Without it a consumer blocked on an empty buffer would hang
    /// forever after `end`/`terminate`.
    #[error("capture stopped")]
    Stopped,
}
