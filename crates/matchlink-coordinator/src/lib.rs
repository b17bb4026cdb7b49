//! Session lifecycle coordination for matchlink.
//!
//! [`SessionCoordinator`] sits between game code and a session backend.
//! It validates requests, allows one in-flight operation per kind, and
//! turns backend completions into [`SessionEvent`](matchlink_types::SessionEvent)s
//! for subscribers.
//!
//! Use it directly from a single-threaded loop, or hand it to
//! [`spawn_coordinator`] and talk to it through a [`CoordinatorHandle`].
//!
//! # Architecture
//!
//! ```text
//! caller ──CoordinatorHandle──→ actor task ──→ SessionProvider
//!   ↑                              │  ↑               │
//!   └──── Subscription ←── events ─┘  └─ completions ─┘
//! ```

mod actor;
mod config;
mod coordinator;
mod error;
mod status;
mod subscribers;

pub use actor::{spawn_coordinator, CoordinatorHandle};
pub use config::CoordinatorConfig;
pub use coordinator::SessionCoordinator;
pub use error::{ConfigError, CoordinatorError};
pub use status::{CoordinatorStatus, SessionPhase};
pub use subscribers::{Subscription, SubscriptionId};
