//! # matchlink
//!
//! Session matchmaking for multiplayer games: host a session, find
//! sessions others host, join one, and travel to it.
//!
//! The work happens in three crates re-exported here:
//!
//! - `matchlink-types`: ids, settings, search results, events
//! - `matchlink-provider`: the backend and context ports, plus an
//!   in-memory LAN backend
//! - `matchlink-coordinator`: the coordinator and its actor task
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use matchlink::prelude::*;
//!
//! matchlink::init_tracing();
//! let network = LocalNetwork::new();
//! let host = MatchlinkBuilder::new().spawn_local(&network, LocalUser::new(1, "host"))?;
//! let mut events = host.subscribe().await?;
//! host.create_session(CreateSessionRequest::new("GameSession", 4)).await?;
//! ```

mod builder;
mod error;
mod telemetry;

use std::path::Path;

pub use builder::MatchlinkBuilder;
pub use error::MatchlinkError;
pub use telemetry::{init_tracing, DEFAULT_LOG_FILTER};

pub use matchlink_coordinator as coordinator;
pub use matchlink_provider as provider;
pub use matchlink_types as types;

use matchlink_coordinator::CoordinatorConfig;

/// Reads and validates a JSON coordinator config file.
pub fn load_config(path: impl AsRef<Path>) -> Result<CoordinatorConfig, MatchlinkError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config = CoordinatorConfig::from_json(&text)?;
    tracing::debug!(path = %path.display(), ?config, "loaded coordinator config");
    Ok(config)
}

/// Everything a typical caller needs.
pub mod prelude {
    pub use crate::{init_tracing, load_config, MatchlinkBuilder, MatchlinkError};
    pub use matchlink_coordinator::{
        spawn_coordinator, CoordinatorConfig, CoordinatorError, CoordinatorHandle,
        CoordinatorStatus, SessionCoordinator, SessionPhase, Subscription,
    };
    pub use matchlink_provider::{
        completion_channel, CompletionSender, LocalNetwork, LocalProvider,
        LocalUserContext, SessionProvider, StaticContext,
    };
    pub use matchlink_types::{
        CreateSessionRequest, FindSessionRequest, JoinResult, LocalUser,
        OperationKind, SearchResultSet, SessionCandidate, SessionEvent,
        SessionName, SessionSettings,
    };
}
