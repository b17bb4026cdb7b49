//! Search queries and the candidates a backend returns for them.

use serde::{Deserialize, Serialize};

use crate::{SessionId, SessionSettings};

/// Parameters of one session search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Upper bound on returned candidates. Always positive.
    pub max_results: u32,

    /// The match type the caller is looking for. Not applied by the
    /// backend; kept so completion handling knows what was asked.
    pub match_type: String,

    /// Search the local network instead of the online service.
    pub lan_query: bool,

    /// Restrict the search to presence-advertised sessions.
    pub presence: bool,
}

/// One session found by a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCandidate {
    /// Backend id of the session. Empty when the backend had no valid
    /// session info for this entry.
    pub session_id: SessionId,

    /// Display name of the hosting user.
    pub owner_name: String,

    /// The host's advertised settings, attributes included.
    pub settings: SessionSettings,

    /// Free player slots at the time of the search.
    pub open_connections: u32,

    /// Round-trip estimate, when the backend measures one.
    #[serde(default)]
    pub ping_ms: Option<u32>,
}

impl SessionCandidate {
    /// `true` if this candidate carries joinable session info.
    pub fn is_valid(&self) -> bool {
        !self.session_id.is_empty()
    }

    /// The advertised match type, if any.
    pub fn match_type(&self) -> Option<&str> {
        self.settings.match_type()
    }
}

/// An ordered list of candidates, as returned by the backend.
///
/// Order matters: [`first_matching`](Self::first_matching) picks by
/// position, so the backend's ranking decides ties.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchResultSet(Vec<SessionCandidate>);

impl SearchResultSet {
    pub fn new(candidates: Vec<SessionCandidate>) -> Self {
        Self(candidates)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SessionCandidate> {
        self.0.iter()
    }

    /// Drops everything past the first `len` candidates.
    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    /// Returns the first candidate (in result order) with valid session
    /// info whose match type equals `match_type`.
    ///
    /// Candidates without session info or without a match type are
    /// skipped, never matched.
    pub fn first_matching(&self, match_type: &str) -> Option<&SessionCandidate> {
        self.0
            .iter()
            .filter(|candidate| candidate.is_valid())
            .find(|candidate| candidate.match_type() == Some(match_type))
    }
}

impl From<Vec<SessionCandidate>> for SearchResultSet {
    fn from(candidates: Vec<SessionCandidate>) -> Self {
        Self(candidates)
    }
}

impl IntoIterator for SearchResultSet {
    type Item = SessionCandidate;
    type IntoIter = std::vec::IntoIter<SessionCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a SearchResultSet {
    type Item = &'a SessionCandidate;
    type IntoIter = std::slice::Iter<'a, SessionCandidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
