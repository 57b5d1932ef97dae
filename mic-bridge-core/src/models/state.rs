use std::fmt;

/// Capture lifecycle state machine.
///
/// State transitions:
/// ```text
/// uninitialized → standby → running ↔ paused
///                              ↕        |
///                          terminated   |
///                              |        |
///                   (end) uninitialized ┘
/// ```
///
/// `standby` acquires the device, `begin` starts production, `pause` and
/// `terminate` gate production off (terminate also discards unread data),
/// `resume` re-enters `Running`, and `end` releases everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Uninitialized,
    Standby,
    Running,
    Paused,
    Terminated,
}

impl BridgeState {
    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Whether the device has been acquired (any state past `standby`).
    pub fn is_acquired(&self) -> bool {
        !matches!(self, Self::Uninitialized)
    }

    /// Whether consumer `read` calls are accepted in this state.
    pub fn is_readable(&self) -> bool {
        matches!(self, Self::Running | Self::Paused)
    }
}

impl fmt::Display for BridgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Standby => "standby",
            Self::Running => "running",
            Self::Paused => "paused",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
