//! The local session phase and the coordinator status snapshot.

use std::fmt;

use matchlink_types::{OperationKind, SessionName};
use serde::{Deserialize, Serialize};

/// What the coordinator currently holds.
///
/// ```text
/// Idle ──(create ok)──→ Hosting ──(start ok)──→ InProgress
///   │                                              │
///   └──(join ok)──→ Joined ──(start ok)────────────┘
///
/// any ──(destroy ok)──→ Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    Idle,
    Hosting,
    Joined,
    InProgress,
}

impl SessionPhase {
    /// `true` if a session is held locally in any form.
    pub fn has_session(self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// `true` if the held session may be started.
    pub fn can_start(self) -> bool {
        matches!(self, Self::Hosting | Self::Joined)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "Idle"),
            Self::Hosting => write!(f, "Hosting"),
            Self::Joined => write!(f, "Joined"),
            Self::InProgress => write!(f, "InProgress"),
        }
    }
}

/// A read-only snapshot of a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    /// Name of the bound backend, `None` without a provider.
    pub backend: Option<String>,
    pub phase: SessionPhase,
    pub current_session: SessionName,
    pub current_match_type: String,
    /// Operations waiting for a completion, in [`OperationKind::ALL`] order.
    pub in_flight: Vec<OperationKind>,
    pub subscribers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_can_start() {
        assert!(!SessionPhase::Idle.can_start());
        assert!(SessionPhase::Hosting.can_start());
        assert!(SessionPhase::Joined.can_start());
        assert!(!SessionPhase::InProgress.can_start());
    }

    #[test]
    fn test_phase_has_session() {
        assert!(!SessionPhase::Idle.has_session());
        assert!(SessionPhase::InProgress.has_session());
        assert_eq!(SessionPhase::Joined.to_string(), "Joined");
    }
}
