//! Error types for the coordinator layer.

use matchlink_types::{JoinResult, OperationKind, SessionName};

/// Why the coordinator refused or could not run an operation.
///
/// Every variant is also reported on the event channel as a failure
/// completion of the operation's kind, so callers that only listen to
/// events never miss a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    /// The coordinator was built without a session provider.
    #[error("no session provider is bound")]
    ProviderUnavailable,

    /// An operation of the same kind is still waiting for its completion.
    /// The caller may retry once that completion arrives.
    #[error("a {0} operation is already in flight")]
    AlreadyInFlight(OperationKind),

    /// There is no active local context to act in.
    #[error("no valid local context")]
    InvalidContext,

    /// No local user is signed in.
    #[error("no local user is signed in")]
    NoLocalUser,

    /// A request parameter is out of range (e.g. zero connections).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The search candidate carries no valid session info.
    #[error("search candidate has no valid session info")]
    InvalidCandidate,

    /// There is no session to start or destroy.
    #[error("no session named {0}")]
    NoSession(SessionName),

    /// The provider refused the request outright; no completion will come.
    #[error("provider rejected the {0} request")]
    ProviderRejected(OperationKind),

    /// The coordinator task has stopped.
    #[error("coordinator is unavailable")]
    Unavailable,
}

impl CoordinatorError {
    /// The join code reported when a join is refused with this error.
    pub fn join_result(&self) -> JoinResult {
        match self {
            Self::InvalidCandidate => JoinResult::NoSession,
            _ => JoinResult::UnknownError,
        }
    }
}

/// Errors in coordinator configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The config text is not valid JSON for [`CoordinatorConfig`](crate::CoordinatorConfig).
    #[error("config parse failed: {0}")]
    Parse(#[from] serde_json::Error),

    /// The config parsed but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_result_for_invalid_candidate_is_no_session() {
        assert_eq!(
            CoordinatorError::InvalidCandidate.join_result(),
            JoinResult::NoSession
        );
        assert_eq!(
            CoordinatorError::NoLocalUser.join_result(),
            JoinResult::UnknownError
        );
    }

    #[test]
    fn test_display_names_operation_kind() {
        let err = CoordinatorError::AlreadyInFlight(OperationKind::Find);
        assert_eq!(err.to_string(), "a find operation is already in flight");
    }
}
