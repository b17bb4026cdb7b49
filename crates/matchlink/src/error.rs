//! Unified error type for matchlink.

use matchlink_coordinator::{ConfigError, CoordinatorError};

/// Top-level error that wraps the errors of every matchlink crate.
///
/// The `#[from]` conversions let `?` lift sub-crate errors
/// automatically.
#[derive(Debug, thiserror::Error)]
pub enum MatchlinkError {
    /// An operation was refused or the coordinator is gone.
    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    /// The coordinator config is malformed or out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A config file could not be read.
    #[error("config file unreadable: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coordinator_error() {
        let err: MatchlinkError = CoordinatorError::NoLocalUser.into();
        assert!(matches!(err, MatchlinkError::Coordinator(_)));
        assert_eq!(err.to_string(), "no local user is signed in");
    }

    #[test]
    fn test_from_config_error() {
        let err: MatchlinkError = ConfigError::Invalid("bad".into()).into();
        assert!(matches!(err, MatchlinkError::Config(_)));
        assert!(err.to_string().contains("bad"));
    }

    #[test]
    fn test_from_io_error() {
        let err: MatchlinkError =
            std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
        assert!(matches!(err, MatchlinkError::Io(_)));
    }
}
