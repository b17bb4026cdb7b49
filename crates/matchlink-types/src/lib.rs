//! Shared value types for matchlink.
//!
//! Every layer speaks in these types:
//!
//! - **Identities** ([`LocalUser`], [`SessionName`], [`SessionId`],
//!   [`CompletionHandle`])
//! - **Descriptors** ([`SessionSettings`], [`SearchQuery`],
//!   [`SessionCandidate`], [`SearchResultSet`])
//! - **Completions** ([`ProviderCompletion`]) flowing from a backend to
//!   the coordinator, and **events** ([`SessionEvent`]) flowing from the
//!   coordinator to callers.
//!
//! ```text
//! Caller ← SessionEvent ← Coordinator ← ProviderCompletion ← Backend
//! ```
//!
//! Nothing here does I/O. Attribute serialization on the wire belongs to
//! the backend.

mod events;
mod ids;
mod request;
mod search;
mod settings;

pub use events::{
    CompletionOutcome, JoinResult, OperationKind, ProviderCompletion,
    SessionEvent,
};
pub use ids::{CompletionHandle, LocalUser, SessionId, SessionName, UserId};
pub use request::{
    CreateSessionRequest, FindSessionRequest, DEFAULT_MATCH_TYPE,
    DEFAULT_MAX_SEARCH_RESULTS,
};
pub use search::{SearchQuery, SearchResultSet, SessionCandidate};
pub use settings::{AttributeMap, SessionSettings, MATCH_TYPE_KEY};
