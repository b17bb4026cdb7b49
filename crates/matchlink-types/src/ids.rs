//! Identity types: who is playing, which session, which listener.
//!
//! These are "newtype wrappers" around a primitive. Wrapping keeps a
//! `SessionName` from being passed where a `SessionId` is expected, even
//! though both are strings underneath.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Local user
// ---------------------------------------------------------------------------

/// A unique identifier for a local user (the backend's net id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// The identity a coordinator acts on behalf of.
///
/// Resolved from the local-user context every time an operation is
/// issued; never cached by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUser {
    pub id: UserId,
    /// Shown to other players as the session owner.
    pub display_name: String,
}

impl LocalUser {
    pub fn new(id: u64, display_name: impl Into<String>) -> Self {
        Self {
            id: UserId(id),
            display_name: display_name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Session naming
// ---------------------------------------------------------------------------

/// The local name a session is registered under (e.g. `"GameSession"`).
///
/// Unique within one local-user context. Two players in the same match
/// usually hold it under the same name, but the name is never sent to
/// other players; the [`SessionId`] is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(pub String);

impl SessionName {
    /// The name used when the caller doesn't pick one.
    pub const GAME_SESSION: &'static str = "GameSession";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionName {
    fn default() -> Self {
        Self(Self::GAME_SESSION.to_string())
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for SessionName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Backend-assigned identifier of a hosted session, as seen in searches.
///
/// An empty id means the backend returned a result without valid session
/// info; such candidates can't be joined.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Completion listeners
// ---------------------------------------------------------------------------

/// Handle of a completion listener registered with a provider.
///
/// The coordinator registers one listener per accepted operation and
/// clears it when the matching completion arrives. A completion carrying
/// any other handle is not an answer to the pending operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionHandle(pub u64);

impl fmt::Display for CompletionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_name_default_is_game_session() {
        assert_eq!(SessionName::default().as_str(), "GameSession");
    }

    #[test]
    fn test_display_formats() {
        assert_eq!(UserId(7).to_string(), "U-7");
        assert_eq!(CompletionHandle(3).to_string(), "L-3");
        assert_eq!(SessionName::from("Lobby").to_string(), "Lobby");
    }

    #[test]
    fn test_session_id_empty_means_invalid_info() {
        assert!(SessionId::default().is_empty());
        assert!(!SessionId("abc".into()).is_empty());
    }

    #[test]
    fn test_session_name_serializes_transparently() {
        let json = serde_json::to_string(&SessionName::from("Lobby")).unwrap();
        assert_eq!(json, "\"Lobby\"");
    }
}
