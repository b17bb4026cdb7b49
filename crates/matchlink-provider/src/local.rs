//! In-memory LAN backend.
//!
//! [`LocalNetwork`] is a shared registry of hosted sessions; every
//! [`LocalProvider`] cloned from the same network sees the same
//! sessions. It behaves like a LAN/null online subsystem: sessions are
//! visible to searches as soon as they are created, and each call is
//! answered on the completion channel right away (delivery still goes
//! through the channel, so callers observe it asynchronously).

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use matchlink_types::{
    CompletionHandle, CompletionOutcome, JoinResult, LocalUser,
    OperationKind, ProviderCompletion, SearchQuery, SearchResultSet,
    SessionCandidate, SessionId, SessionName, SessionSettings, UserId,
};
use rand::Rng;

use crate::{CompletionSender, ListenerRegistry, SessionProvider};

/// Address handed out when a provider doesn't set its own.
pub const DEFAULT_HOST_ADDRESS: &str = "127.0.0.1:7777";

// ---------------------------------------------------------------------------
// LocalNetwork
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct HostedSession {
    id: SessionId,
    owner: UserId,
    owner_name: String,
    settings: SessionSettings,
    address: String,
    /// Host first, then joiners in join order.
    members: Vec<UserId>,
    started: bool,
}

impl HostedSession {
    fn open_connections(&self) -> u32 {
        let taken = u32::try_from(self.members.len()).unwrap_or(u32::MAX);
        self.settings.max_connections.saturating_sub(taken)
    }

    fn to_candidate(&self) -> SessionCandidate {
        SessionCandidate {
            session_id: self.id.clone(),
            owner_name: self.owner_name.clone(),
            settings: self.settings.clone(),
            open_connections: self.open_connections(),
            ping_ms: None,
        }
    }
}

#[derive(Debug, Default)]
struct NetworkState {
    /// Registration order is search order.
    sessions: Vec<HostedSession>,
}

impl NetworkState {
    fn session_mut(&mut self, id: &SessionId) -> Option<&mut HostedSession> {
        self.sessions.iter_mut().find(|s| &s.id == id)
    }
}

/// A shared, in-process "network" of hosted sessions.
///
/// Cheap to clone; all clones share one registry.
#[derive(Debug, Clone, Default)]
pub struct LocalNetwork {
    inner: Arc<Mutex<NetworkState>>,
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently hosted on this network.
    pub fn session_count(&self) -> usize {
        self.lock().sessions.len()
    }

    /// Number of players (host included) in the session with `id`.
    pub fn member_count(&self, id: &SessionId) -> Option<usize> {
        self.lock()
            .sessions
            .iter()
            .find(|s| &s.id == id)
            .map(|s| s.members.len())
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        // A panic while holding the lock can't leave the registry half
        // written (every mutation is a single push/remove/assign).
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// LocalProvider
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct HeldSession {
    id: SessionId,
    member: UserId,
    hosting: bool,
}

/// One local user's view of a [`LocalNetwork`].
pub struct LocalProvider {
    network: LocalNetwork,
    completions: CompletionSender,
    listeners: ListenerRegistry,
    /// Sessions this provider hosts or has joined, by local name.
    held: HashMap<SessionName, HeldSession>,
    backend_name: String,
    host_address: String,
    local_only: bool,
}

impl LocalProvider {
    /// Creates a LAN provider on `network` that answers on `completions`.
    pub fn new(network: LocalNetwork, completions: CompletionSender) -> Self {
        Self {
            network,
            completions,
            listeners: ListenerRegistry::new(),
            held: HashMap::new(),
            backend_name: "LAN".to_string(),
            host_address: DEFAULT_HOST_ADDRESS.to_string(),
            local_only: true,
        }
    }

    /// Sets the address clients travel to when joining sessions this
    /// provider hosts.
    pub fn with_host_address(mut self, address: impl Into<String>) -> Self {
        self.host_address = address.into();
        self
    }

    /// Makes the provider behave like an online-service backend: hosted
    /// sessions are not LAN matches and searches are not LAN queries.
    pub fn online(mut self, backend_name: impl Into<String>) -> Self {
        self.backend_name = backend_name.into();
        self.local_only = false;
        self
    }

    /// Pushes `outcome` to the listener of its kind, if one is registered.
    fn deliver(&self, outcome: CompletionOutcome) {
        let kind = outcome.kind();
        let Some(handle) = self.listeners.handle_for(kind) else {
            tracing::trace!(%kind, "no listener registered, completion dropped");
            return;
        };
        if self
            .completions
            .send(ProviderCompletion { handle, outcome })
            .is_err()
        {
            tracing::debug!(%kind, "completion receiver gone");
        }
    }

    fn resolve_join(
        &self,
        user: &LocalUser,
        name: &SessionName,
        candidate: &SessionCandidate,
    ) -> JoinResult {
        if self.held.contains_key(name) {
            return JoinResult::AlreadyInSession;
        }

        let mut state = self.network.lock();
        let Some(session) = state.session_mut(&candidate.session_id) else {
            return JoinResult::NoSession;
        };
        if session.members.contains(&user.id) {
            return JoinResult::AlreadyInSession;
        }
        if session.open_connections() == 0 {
            return JoinResult::SessionIsFull;
        }
        if session.started && !session.settings.allow_join_in_progress {
            return JoinResult::SessionDoesNotMatch;
        }

        session.members.push(user.id);
        JoinResult::Success
    }
}

impl SessionProvider for LocalProvider {
    fn backend_name(&self) -> &str {
        &self.backend_name
    }

    fn is_local_only(&self) -> bool {
        self.local_only
    }

    fn add_completion_listener(&mut self, kind: OperationKind) -> CompletionHandle {
        self.listeners.add(kind)
    }

    fn clear_completion_listener(&mut self, handle: CompletionHandle) {
        self.listeners.clear(handle);
    }

    fn create_session(
        &mut self,
        user: &LocalUser,
        name: &SessionName,
        settings: &SessionSettings,
    ) -> bool {
        if self.held.contains_key(name) {
            tracing::warn!(session = %name, "session name already in use");
            return false;
        }

        let id = generate_session_id();
        self.network.lock().sessions.push(HostedSession {
            id: id.clone(),
            owner: user.id,
            owner_name: user.display_name.clone(),
            settings: settings.clone(),
            address: self.host_address.clone(),
            members: vec![user.id],
            started: false,
        });
        self.held.insert(
            name.clone(),
            HeldSession {
                id: id.clone(),
                member: user.id,
                hosting: true,
            },
        );
        tracing::debug!(session = %name, %id, "local session hosted");

        self.deliver(CompletionOutcome::Create {
            session_name: name.clone(),
            success: true,
        });
        true
    }

    fn find_sessions(&mut self, user: &LocalUser, query: &SearchQuery) -> bool {
        let limit = usize::try_from(query.max_results).unwrap_or(usize::MAX);
        let candidates: Vec<SessionCandidate> = self
            .network
            .lock()
            .sessions
            .iter()
            .filter(|s| s.owner != user.id)
            .filter(|s| s.settings.should_advertise)
            .filter(|s| s.settings.is_lan_match == query.lan_query)
            .filter(|s| !query.presence || s.settings.uses_presence)
            .filter(|s| !s.started || s.settings.allow_join_in_progress)
            .take(limit)
            .map(HostedSession::to_candidate)
            .collect();

        tracing::debug!(found = candidates.len(), "local search finished");
        self.deliver(CompletionOutcome::Find {
            success: true,
            results: SearchResultSet::new(candidates),
        });
        true
    }

    fn join_session(
        &mut self,
        user: &LocalUser,
        name: &SessionName,
        candidate: &SessionCandidate,
    ) -> bool {
        let result = self.resolve_join(user, name, candidate);
        if result.is_success() {
            self.held.insert(
                name.clone(),
                HeldSession {
                    id: candidate.session_id.clone(),
                    member: user.id,
                    hosting: false,
                },
            );
        }

        self.deliver(CompletionOutcome::Join {
            session_name: name.clone(),
            result,
        });
        true
    }

    fn start_session(&mut self, name: &SessionName) -> bool {
        let Some(held) = self.held.get(name) else {
            return false;
        };
        if held.hosting {
            if let Some(session) = self.network.lock().session_mut(&held.id) {
                session.started = true;
            }
        }

        self.deliver(CompletionOutcome::Start {
            session_name: name.clone(),
            success: true,
        });
        true
    }

    fn destroy_session(&mut self, name: &SessionName) -> bool {
        let Some(held) = self.held.remove(name) else {
            return false;
        };

        {
            let mut state = self.network.lock();
            if held.hosting {
                state.sessions.retain(|s| s.id != held.id);
            } else if let Some(session) = state.session_mut(&held.id) {
                session.members.retain(|member| *member != held.member);
            }
        }

        self.deliver(CompletionOutcome::Destroy {
            session_name: name.clone(),
            success: true,
        });
        true
    }

    fn has_named_session(&self, name: &SessionName) -> bool {
        self.held.contains_key(name)
    }

    fn resolve_connect_address(&self, name: &SessionName) -> Option<String> {
        let held = self.held.get(name)?;
        self.network
            .lock()
            .sessions
            .iter()
            .find(|s| s.id == held.id)
            .map(|s| s.address.clone())
    }
}

/// Generates a random 32-character hex session id (128 bits).
fn generate_session_id() -> SessionId {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    SessionId(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

// =========================================================================
// Tests
// =========================================================================
