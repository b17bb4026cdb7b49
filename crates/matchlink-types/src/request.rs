//! Caller-facing request parameters, with the defaults UIs rely on.

use serde::{Deserialize, Serialize};

use crate::SessionName;

/// Match type used when the caller doesn't name one.
pub const DEFAULT_MATCH_TYPE: &str = "FreeForAll";

/// Search size used when the caller doesn't pick one.
pub const DEFAULT_MAX_SEARCH_RESULTS: u32 = 1000;

/// Parameters for hosting a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub name: SessionName,
    pub max_connections: u32,
    pub match_type: String,
}

impl CreateSessionRequest {
    /// A request with the default match type.
    pub fn new(name: impl Into<SessionName>, max_connections: u32) -> Self {
        Self {
            name: name.into(),
            max_connections,
            match_type: DEFAULT_MATCH_TYPE.to_string(),
        }
    }

    pub fn match_type(mut self, match_type: impl Into<String>) -> Self {
        self.match_type = match_type.into();
        self
    }
}

/// Parameters for searching sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindSessionRequest {
    pub max_results: u32,
    /// Local name the joined session will be held under.
    pub name: SessionName,
    pub match_type: String,
}

impl FindSessionRequest {
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn name(mut self, name: impl Into<SessionName>) -> Self {
        self.name = name.into();
        self
    }

    pub fn match_type(mut self, match_type: impl Into<String>) -> Self {
        self.match_type = match_type.into();
        self
    }
}

impl Default for FindSessionRequest {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_SEARCH_RESULTS,
            name: SessionName::default(),
            match_type: DEFAULT_MATCH_TYPE.to_string(),
        }
    }
}
