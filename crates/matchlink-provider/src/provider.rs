//! The session provider port: what a coordinator needs from a backend.
//!
//! matchlink doesn't talk to any online service itself. A backend (a
//! platform SDK binding, a LAN broadcaster, the in-memory
//! [`LocalProvider`](crate::LocalProvider)) implements [`SessionProvider`]
//! and the coordinator drives it.
//!
//! # Completion model
//!
//! Every operation is issued synchronously and answered later:
//!
//! ```text
//! coordinator                      provider
//!     │ add_completion_listener(k) ──→ │  returns handle H
//!     │ create_session(..) ──────────→ │  returns true (accepted)
//!     │                                 │  ... backend work ...
//!     │ ←──── ProviderCompletion{H, ..} │  pushed on the CompletionSender
//!     │ clear_completion_listener(H) ─→ │
//! ```
//!
//! A `false` return means the backend rejected the call outright and
//! will never answer it. Completions are only delivered while a listener
//! of their kind is registered.

use std::collections::HashMap;

use matchlink_types::{
    CompletionHandle, LocalUser, OperationKind, ProviderCompletion,
    SearchQuery, SessionCandidate, SessionName, SessionSettings,
};
use tokio::sync::mpsc;

/// Channel a provider pushes completions into.
pub type CompletionSender = mpsc::UnboundedSender<ProviderCompletion>;

/// Receiving end, owned by whoever drives the coordinator.
pub type CompletionReceiver = mpsc::UnboundedReceiver<ProviderCompletion>;

/// Creates the completion channel that links a provider to a coordinator.
pub fn completion_channel() -> (CompletionSender, CompletionReceiver) {
    mpsc::unbounded_channel()
}

/// A session backend.
///
/// `Send + 'static` so the coordinator (and the provider inside it) can
/// move into its own task.
pub trait SessionProvider: Send + 'static {
    /// Human-readable backend name, used in logs.
    fn backend_name(&self) -> &str;

    /// `true` for LAN-only backends. Decides both the LAN flag of hosted
    /// sessions and whether searches are LAN queries.
    fn is_local_only(&self) -> bool;

    /// Registers a listener for completions of `kind`.
    fn add_completion_listener(&mut self, kind: OperationKind) -> CompletionHandle;

    /// Removes a listener. Unknown handles are ignored.
    fn clear_completion_listener(&mut self, handle: CompletionHandle);

    /// Hosts a session under `name`.
    fn create_session(
        &mut self,
        user: &LocalUser,
        name: &SessionName,
        settings: &SessionSettings,
    ) -> bool;

    /// Searches for joinable sessions.
    fn find_sessions(&mut self, user: &LocalUser, query: &SearchQuery) -> bool;

    /// Joins `candidate`, holding it locally under `name`.
    fn join_session(
        &mut self,
        user: &LocalUser,
        name: &SessionName,
        candidate: &SessionCandidate,
    ) -> bool;

    /// Marks the named session as in progress.
    fn start_session(&mut self, name: &SessionName) -> bool;

    /// Tears down (or leaves) the named session.
    fn destroy_session(&mut self, name: &SessionName) -> bool;

    /// `true` if a session is currently held under `name`.
    fn has_named_session(&self, name: &SessionName) -> bool;

    /// The address a client should travel to for the named session.
    fn resolve_connect_address(&self, name: &SessionName) -> Option<String>;
}

/// Bookkeeping for completion listeners, one per operation kind.
///
/// Backends can embed this to implement the listener half of
/// [`SessionProvider`]. Registering a kind that already has a listener
/// replaces it; the old handle stops receiving completions.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_handle: u64,
    listeners: HashMap<OperationKind, CompletionHandle>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, kind: OperationKind) -> CompletionHandle {
        self.next_handle += 1;
        let handle = CompletionHandle(self.next_handle);
        self.listeners.insert(kind, handle);
        handle
    }

    pub fn clear(&mut self, handle: CompletionHandle) {
        self.listeners.retain(|_, registered| *registered != handle);
    }

    /// The listener currently registered for `kind`, if any.
    pub fn handle_for(&self, kind: OperationKind) -> Option<CompletionHandle> {
        self.listeners.get(&kind).copied()
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_returns_distinct_handles() {
        let mut registry = ListenerRegistry::new();

        let create = registry.add(OperationKind::Create);
        let find = registry.add(OperationKind::Find);

        assert_ne!(create, find);
        assert_eq!(registry.handle_for(OperationKind::Create), Some(create));
        assert_eq!(registry.handle_for(OperationKind::Find), Some(find));
    }

    #[test]
    fn test_add_same_kind_replaces_listener() {
        let mut registry = ListenerRegistry::new();

        let first = registry.add(OperationKind::Join);
        let second = registry.add(OperationKind::Join);

        assert_eq!(registry.handle_for(OperationKind::Join), Some(second));
        assert_ne!(first, second);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_clear_removes_only_that_handle() {
        let mut registry = ListenerRegistry::new();
        let create = registry.add(OperationKind::Create);
        let find = registry.add(OperationKind::Find);

        registry.clear(create);

        assert_eq!(registry.handle_for(OperationKind::Create), None);
        assert_eq!(registry.handle_for(OperationKind::Find), Some(find));
    }

    #[test]
    fn test_clear_stale_handle_is_noop() {
        let mut registry = ListenerRegistry::new();
        let stale = registry.add(OperationKind::Join);
        let current = registry.add(OperationKind::Join);

        registry.clear(stale);

        assert_eq!(registry.handle_for(OperationKind::Join), Some(current));
    }
}
