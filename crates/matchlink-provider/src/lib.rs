//! Backend ports for matchlink.
//!
//! The coordinator depends on two collaborators it never implements:
//!
//! 1. **A session backend** ([`SessionProvider`]): hosts, finds, joins,
//!    starts and destroys sessions, answering on a completion channel.
//! 2. **A local-user context** ([`LocalUserContext`]): tells whether
//!    there is an active context, who is signed in, and whether they can
//!    travel.
//!
//! Both are injected at construction; there is no global lookup.
//!
//! # Feature Flags
//!
//! - `local` (default): [`LocalProvider`], an in-memory LAN backend
//!   over a shared [`LocalNetwork`]

mod context;
#[cfg(feature = "local")]
mod local;
mod provider;

pub use context::{LocalUserContext, StaticContext};
#[cfg(feature = "local")]
pub use local::{LocalNetwork, LocalProvider, DEFAULT_HOST_ADDRESS};
pub use provider::{
    completion_channel, CompletionReceiver, CompletionSender,
    ListenerRegistry, SessionProvider,
};
