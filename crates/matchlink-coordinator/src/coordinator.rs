//! The session coordinator: one caller-facing state machine in front of a
//! session backend.
//!
//! # Operation lifecycle
//!
//! ```text
//! caller ──create/find/join/start/destroy──→ preconditions
//!                                               │ fail → failure event + Err
//!                                               ▼
//!                                  register listener, record in-flight
//!                                               │
//!                                   provider call ── false → roll back,
//!                                               │            failure event + Err
//!                                               ▼
//!                                     Ok(()) (accepted)
//!                                               ⋮
//! provider ──ProviderCompletion{handle}──→ handle_completion
//!                                               │ handle ≠ recorded → ignored
//!                                               ▼
//!                                 clear record + listener, update state,
//!                                 emit completion event
//! ```
//!
//! At most one operation of each kind is in flight. Kinds may overlap.
//! Every accepted operation ends in exactly one completion event, either
//! from the backend or from [`SessionCoordinator::expire_stale`].

use std::collections::HashMap;

use matchlink_provider::{LocalUserContext, SessionProvider};
use matchlink_types::{
    CompletionHandle, CompletionOutcome, CreateSessionRequest,
    FindSessionRequest, JoinResult, LocalUser, OperationKind,
    ProviderCompletion, SearchQuery, SearchResultSet, SessionCandidate,
    SessionEvent, SessionName, SessionSettings, DEFAULT_MATCH_TYPE,
};
use tokio::time::Instant;

use crate::subscribers::EventSubscribers;
use crate::{
    CoordinatorConfig, CoordinatorError, CoordinatorStatus, SessionPhase,
    Subscription, SubscriptionId,
};

#[derive(Debug, Clone, Copy)]
struct InFlight {
    handle: CompletionHandle,
    since: Instant,
}

/// Coordinates session operations for one local user.
///
/// Entry points never block: they validate, hand the request to the
/// provider, and return. Outcomes arrive later through
/// [`handle_completion`](Self::handle_completion) and are reported to
/// subscribers as [`SessionEvent`]s.
pub struct SessionCoordinator<P, C> {
    provider: Option<P>,
    context: C,
    config: CoordinatorConfig,
    in_flight: HashMap<OperationKind, InFlight>,
    subscribers: EventSubscribers,
    settings: Option<SessionSettings>,
    pending_query: Option<SearchQuery>,
    last_results: Option<SearchResultSet>,
    current_session: SessionName,
    current_match_type: String,
    phase: SessionPhase,
}

impl<P: SessionProvider, C: LocalUserContext> SessionCoordinator<P, C> {
    pub fn new(provider: P, context: C, config: CoordinatorConfig) -> Self {
        tracing::info!(
            backend = provider.backend_name(),
            local_only = provider.is_local_only(),
            "session coordinator bound to provider"
        );
        Self::build(Some(provider), context, config)
    }

    /// A coordinator with no backend. Every operation fails with
    /// [`CoordinatorError::ProviderUnavailable`].
    pub fn detached(context: C, config: CoordinatorConfig) -> Self {
        tracing::warn!("session coordinator created without a provider");
        Self::build(None, context, config)
    }

    fn build(provider: Option<P>, context: C, config: CoordinatorConfig) -> Self {
        Self {
            provider,
            context,
            config,
            in_flight: HashMap::new(),
            subscribers: EventSubscribers::default(),
            settings: None,
            pending_query: None,
            last_results: None,
            current_session: SessionName::default(),
            current_match_type: DEFAULT_MATCH_TYPE.to_string(),
            phase: SessionPhase::Idle,
        }
    }

    // -- Accessors -------------------------------------------------------

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    /// Mutable access to the context, e.g. to sign a user in or out.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Name the last created or targeted session is held under.
    pub fn current_session(&self) -> &SessionName {
        &self.current_session
    }

    pub fn current_match_type(&self) -> &str {
        &self.current_match_type
    }

    /// Settings of the session this coordinator last created.
    pub fn session_settings(&self) -> Option<&SessionSettings> {
        self.settings.as_ref()
    }

    /// Results of the last successful search.
    pub fn last_results(&self) -> Option<&SearchResultSet> {
        self.last_results.as_ref()
    }

    pub fn is_in_flight(&self, kind: OperationKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    pub fn status(&self) -> CoordinatorStatus {
        CoordinatorStatus {
            backend: self.provider.as_ref().map(|p| p.backend_name().to_string()),
            phase: self.phase,
            current_session: self.current_session.clone(),
            current_match_type: self.current_match_type.clone(),
            in_flight: OperationKind::ALL
                .into_iter()
                .filter(|kind| self.in_flight.contains_key(kind))
                .collect(),
            subscribers: self.subscribers.len(),
        }
    }

    // -- Subscribers -----------------------------------------------------

    pub fn subscribe(&mut self) -> Subscription {
        self.subscribers.subscribe()
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    // -- Operations ------------------------------------------------------

    /// Hosts a new session.
    ///
    /// A session already held under the same name is destroyed first,
    /// without waiting for or reporting that destroy.
    pub fn create_session(
        &mut self,
        request: CreateSessionRequest,
    ) -> Result<(), CoordinatorError> {
        self.try_create(request)
            .map_err(|err| self.reject(OperationKind::Create, err))
    }

    fn try_create(&mut self, request: CreateSessionRequest) -> Result<(), CoordinatorError> {
        self.check_available(OperationKind::Create)?;
        let user = resolve_user(&self.context)?;
        if request.max_connections == 0 {
            return Err(CoordinatorError::InvalidArgument(
                "max_connections must be positive".into(),
            ));
        }
        let Some(provider) = self.provider.as_mut() else {
            return Err(CoordinatorError::ProviderUnavailable);
        };

        if provider.has_named_session(&request.name) {
            tracing::info!(session = %request.name, "destroying existing session before re-create");
            provider.destroy_session(&request.name);
            // The held session is gone whether or not the new create lands.
            if self.phase.has_session() && self.current_session == request.name {
                self.phase = SessionPhase::Idle;
                self.settings = None;
            }
        }

        let settings = SessionSettings::hosted(
            request.max_connections,
            &request.match_type,
            provider.is_local_only(),
        );
        tracing::info!(
            session = %request.name,
            max_connections = request.max_connections,
            match_type = %request.match_type,
            lan = settings.is_lan_match,
            "creating session"
        );

        let name = request.name;
        issue(provider, &mut self.in_flight, OperationKind::Create, |p| {
            p.create_session(&user, &name, &settings)
        })?;
        self.current_match_type = request.match_type;
        self.settings = Some(settings);
        Ok(())
    }

    /// Searches for joinable sessions.
    ///
    /// Results are delivered unfiltered; pick one with
    /// [`SearchResultSet::first_matching`] and pass it to
    /// [`join_session`](Self::join_session).
    pub fn find_session(&mut self, request: FindSessionRequest) -> Result<(), CoordinatorError> {
        self.try_find(request)
            .map_err(|err| self.reject(OperationKind::Find, err))
    }

    fn try_find(&mut self, request: FindSessionRequest) -> Result<(), CoordinatorError> {
        self.check_available(OperationKind::Find)?;
        let user = resolve_user(&self.context)?;
        if request.max_results == 0 {
            return Err(CoordinatorError::InvalidArgument(
                "max_results must be positive".into(),
            ));
        }
        let Some(provider) = self.provider.as_mut() else {
            return Err(CoordinatorError::ProviderUnavailable);
        };

        self.current_session = request.name;
        self.current_match_type = request.match_type;

        let query = SearchQuery {
            max_results: request.max_results,
            match_type: self.current_match_type.clone(),
            lan_query: provider.is_local_only(),
            presence: true,
        };
        tracing::info!(
            max_results = query.max_results,
            match_type = %query.match_type,
            lan = query.lan_query,
            "finding sessions"
        );

        issue(provider, &mut self.in_flight, OperationKind::Find, |p| {
            p.find_sessions(&user, &query)
        })?;
        self.pending_query = Some(query);
        Ok(())
    }

    /// Joins `candidate` under the current session name.
    ///
    /// On success a `TravelRequested` event follows the `JoinCompleted`
    /// event, carrying the address to connect to.
    pub fn join_session(&mut self, candidate: &SessionCandidate) -> Result<(), CoordinatorError> {
        self.try_join(candidate)
            .map_err(|err| self.reject(OperationKind::Join, err))
    }

    fn try_join(&mut self, candidate: &SessionCandidate) -> Result<(), CoordinatorError> {
        self.check_available(OperationKind::Join)?;
        let user = resolve_user(&self.context)?;
        if !candidate.is_valid() {
            return Err(CoordinatorError::InvalidCandidate);
        }
        let Some(provider) = self.provider.as_mut() else {
            return Err(CoordinatorError::ProviderUnavailable);
        };

        let name = self.current_session.clone();
        tracing::info!(
            session = %name,
            session_id = %candidate.session_id,
            owner = %candidate.owner_name,
            "joining session"
        );
        issue(provider, &mut self.in_flight, OperationKind::Join, |p| {
            p.join_session(&user, &name, candidate)
        })
    }

    /// Starts the held session.
    pub fn start_session(&mut self) -> Result<(), CoordinatorError> {
        self.try_start()
            .map_err(|err| self.reject(OperationKind::Start, err))
    }

    fn try_start(&mut self) -> Result<(), CoordinatorError> {
        self.check_available(OperationKind::Start)?;
        if !self.phase.can_start() {
            return Err(CoordinatorError::NoSession(self.current_session.clone()));
        }
        let Some(provider) = self.provider.as_mut() else {
            return Err(CoordinatorError::ProviderUnavailable);
        };

        let name = self.current_session.clone();
        tracing::info!(session = %name, "starting session");
        issue(provider, &mut self.in_flight, OperationKind::Start, |p| {
            p.start_session(&name)
        })
    }

    /// Destroys the held session, hosted or joined.
    pub fn destroy_session(&mut self) -> Result<(), CoordinatorError> {
        self.try_destroy()
            .map_err(|err| self.reject(OperationKind::Destroy, err))
    }

    fn try_destroy(&mut self) -> Result<(), CoordinatorError> {
        self.check_available(OperationKind::Destroy)?;
        let Some(provider) = self.provider.as_mut() else {
            return Err(CoordinatorError::ProviderUnavailable);
        };
        let name = self.current_session.clone();
        if !provider.has_named_session(&name) {
            return Err(CoordinatorError::NoSession(name));
        }

        tracing::info!(session = %name, "destroying session");
        issue(provider, &mut self.in_flight, OperationKind::Destroy, |p| {
            p.destroy_session(&name)
        })
    }

    // -- Completions -----------------------------------------------------

    /// Applies a backend completion.
    ///
    /// Completions whose handle does not match the in-flight operation of
    /// their kind are ignored.
    pub fn handle_completion(&mut self, completion: ProviderCompletion) {
        let kind = completion.outcome.kind();
        if !self.finish(kind, completion.handle) {
            return;
        }

        match completion.outcome {
            CompletionOutcome::Create { session_name, success } => {
                self.on_create_completed(session_name, success);
            }
            CompletionOutcome::Find { success, results } => {
                self.on_find_completed(success, results);
            }
            CompletionOutcome::Join { session_name, result } => {
                self.on_join_completed(session_name, result);
            }
            CompletionOutcome::Start { session_name, success } => {
                self.on_start_completed(session_name, success);
            }
            CompletionOutcome::Destroy { session_name, success } => {
                self.on_destroy_completed(session_name, success);
            }
        }
    }

    /// Fails every operation that has waited longer than the configured
    /// timeout. Returns the kinds that were failed.
    pub fn expire_stale(&mut self) -> Vec<OperationKind> {
        let Some(timeout) = self.config.operation_timeout() else {
            return Vec::new();
        };

        let expired: Vec<(OperationKind, CompletionHandle)> = OperationKind::ALL
            .into_iter()
            .filter_map(|kind| {
                self.in_flight
                    .get(&kind)
                    .filter(|op| op.since.elapsed() >= timeout)
                    .map(|op| (kind, op.handle))
            })
            .collect();

        for &(kind, handle) in &expired {
            self.in_flight.remove(&kind);
            if let Some(provider) = self.provider.as_mut() {
                provider.clear_completion_listener(handle);
            }
            if kind == OperationKind::Find {
                self.pending_query = None;
            }
            tracing::warn!(%kind, %handle, ?timeout, "operation timed out");
            self.subscribers.emit(SessionEvent::failure(kind));
        }

        expired.into_iter().map(|(kind, _)| kind).collect()
    }

    fn on_create_completed(&mut self, session_name: SessionName, success: bool) {
        if success {
            tracing::info!(session = %session_name, "session created");
            self.phase = SessionPhase::Hosting;
        } else {
            tracing::warn!(session = %session_name, "failed to create session");
            self.settings = None;
        }
        self.current_session = session_name;
        self.subscribers.emit(SessionEvent::CreateCompleted { success });
    }

    fn on_find_completed(&mut self, success: bool, mut results: SearchResultSet) {
        let Some(query) = self.pending_query.take() else {
            tracing::debug!("find completed with no pending query");
            self.subscribers.emit(SessionEvent::failure(OperationKind::Find));
            return;
        };
        if self.in_flight.contains_key(&OperationKind::Join) {
            tracing::debug!("find completed while a join is in flight, dropping results");
            self.subscribers.emit(SessionEvent::failure(OperationKind::Find));
            return;
        }
        if !success {
            tracing::warn!("error finding sessions");
            self.subscribers.emit(SessionEvent::failure(OperationKind::Find));
            return;
        }
        if results.is_empty() {
            tracing::info!("no sessions found");
            self.subscribers.emit(SessionEvent::failure(OperationKind::Find));
            return;
        }

        let limit = usize::try_from(query.max_results).unwrap_or(usize::MAX);
        if results.len() > limit {
            tracing::warn!(found = results.len(), limit, "backend returned too many results");
            results.truncate(limit);
        }
        for candidate in &results {
            tracing::debug!(
                session_id = %candidate.session_id,
                owner = %candidate.owner_name,
                match_type = candidate.match_type().unwrap_or_default(),
                open = candidate.open_connections,
                "session found"
            );
        }
        tracing::info!(count = results.len(), "sessions found");

        self.last_results = Some(results.clone());
        self.subscribers.emit(SessionEvent::FindCompleted {
            results,
            success: true,
        });
    }

    fn on_join_completed(&mut self, session_name: SessionName, result: JoinResult) {
        tracing::info!(session = %session_name, %result, "join completed");
        self.subscribers.emit(SessionEvent::JoinCompleted { result });
        if !result.is_success() {
            return;
        }
        self.phase = SessionPhase::Joined;

        let address = self
            .provider
            .as_ref()
            .and_then(|p| p.resolve_connect_address(&self.current_session));
        let Some(address) = address else {
            tracing::error!(session = %self.current_session, "could not resolve connect address");
            return;
        };
        if !self.context.can_travel() {
            tracing::error!(%address, "no local controller to travel with");
            return;
        }

        tracing::info!(%address, "travelling to joined session");
        self.subscribers.emit(SessionEvent::TravelRequested { address });
    }

    fn on_start_completed(&mut self, session_name: SessionName, success: bool) {
        if success {
            tracing::info!(session = %session_name, "session started");
            self.phase = SessionPhase::InProgress;
        } else {
            tracing::warn!(session = %session_name, "failed to start session");
        }
        self.subscribers.emit(SessionEvent::StartCompleted { success });
    }

    fn on_destroy_completed(&mut self, session_name: SessionName, success: bool) {
        if success {
            tracing::info!(session = %session_name, "session destroyed");
            self.phase = SessionPhase::Idle;
            self.settings = None;
            self.last_results = None;
        } else {
            tracing::warn!(session = %session_name, "failed to destroy session");
        }
        self.subscribers.emit(SessionEvent::DestroyCompleted { success });
    }

    // -- Helpers ---------------------------------------------------------

    fn check_available(&self, kind: OperationKind) -> Result<(), CoordinatorError> {
        if self.provider.is_none() {
            return Err(CoordinatorError::ProviderUnavailable);
        }
        if self.in_flight.contains_key(&kind) {
            return Err(CoordinatorError::AlreadyInFlight(kind));
        }
        Ok(())
    }

    /// Clears the in-flight record for `kind` if `handle` is the one
    /// registered. Returns whether it was.
    fn finish(&mut self, kind: OperationKind, handle: CompletionHandle) -> bool {
        match self.in_flight.get(&kind) {
            Some(op) if op.handle == handle => {
                self.in_flight.remove(&kind);
                if let Some(provider) = self.provider.as_mut() {
                    provider.clear_completion_listener(handle);
                }
                true
            }
            _ => {
                tracing::debug!(%kind, %handle, "ignoring completion with no matching operation");
                false
            }
        }
    }

    fn reject(&mut self, kind: OperationKind, err: CoordinatorError) -> CoordinatorError {
        tracing::warn!(%kind, error = %err, "operation rejected");
        let event = match kind {
            OperationKind::Join => SessionEvent::JoinCompleted {
                result: err.join_result(),
            },
            _ => SessionEvent::failure(kind),
        };
        self.subscribers.emit(event);
        err
    }
}

fn resolve_user<C: LocalUserContext>(context: &C) -> Result<LocalUser, CoordinatorError> {
    if !context.is_valid() {
        return Err(CoordinatorError::InvalidContext);
    }
    context.local_user().ok_or(CoordinatorError::NoLocalUser)
}

/// Registers a listener for `kind`, records it, and runs `call`. Rolls
/// both back if the provider refuses.
fn issue<P: SessionProvider>(
    provider: &mut P,
    in_flight: &mut HashMap<OperationKind, InFlight>,
    kind: OperationKind,
    call: impl FnOnce(&mut P) -> bool,
) -> Result<(), CoordinatorError> {
    let handle = provider.add_completion_listener(kind);
    in_flight.insert(
        kind,
        InFlight {
            handle,
            since: Instant::now(),
        },
    );
    if call(provider) {
        return Ok(());
    }

    provider.clear_completion_listener(handle);
    in_flight.remove(&kind);
    Err(CoordinatorError::ProviderRejected(kind))
}
