use serde::{Deserialize, Serialize};

/// Authoritative lifecycle state of a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SessionState {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl SessionState {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionState::Stopped => "Stopped",
            SessionState::Running => "Running",
            SessionState::Paused => "Paused",
        }
    }

    /// Running or Paused
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Stopped)
    }
}
