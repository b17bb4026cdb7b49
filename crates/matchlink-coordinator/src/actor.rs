//! Coordinator actor: a Tokio task that owns a [`SessionCoordinator`].
//!
//! Caller commands and provider completions arrive on two channels and
//! are applied one at a time, so a completion never interleaves with a
//! half-run command. When an operation timeout is configured the task
//! also sweeps for stale operations on a fixed interval.

use std::future;

use matchlink_provider::{CompletionReceiver, LocalUserContext, SessionProvider};
use matchlink_types::{CreateSessionRequest, FindSessionRequest, SessionCandidate};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};

use crate::{
    CoordinatorError, CoordinatorStatus, SessionCoordinator, Subscription,
    SubscriptionId,
};

type Reply = oneshot::Sender<Result<(), CoordinatorError>>;

/// Commands sent to a coordinator actor through its channel.
pub(crate) enum CoordinatorCommand {
    Create {
        request: CreateSessionRequest,
        reply: Reply,
    },
    Find {
        request: FindSessionRequest,
        reply: Reply,
    },
    Join {
        candidate: SessionCandidate,
        reply: Reply,
    },
    Start {
        reply: Reply,
    },
    Destroy {
        reply: Reply,
    },
    Subscribe {
        reply: oneshot::Sender<Subscription>,
    },
    Unsubscribe {
        id: SubscriptionId,
        reply: oneshot::Sender<bool>,
    },
    Status {
        reply: oneshot::Sender<CoordinatorStatus>,
    },
    Shutdown,
}

/// Handle to a running coordinator actor.
///
/// Cheap to clone. Every method fails with
/// [`CoordinatorError::Unavailable`] once the actor has stopped.
#[derive(Clone)]
pub struct CoordinatorHandle {
    sender: mpsc::Sender<CoordinatorCommand>,
}

impl CoordinatorHandle {
    /// See [`SessionCoordinator::create_session`].
    pub async fn create_session(
        &self,
        request: CreateSessionRequest,
    ) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Create { request, reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    /// See [`SessionCoordinator::find_session`].
    pub async fn find_session(
        &self,
        request: FindSessionRequest,
    ) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Find { request, reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    /// See [`SessionCoordinator::join_session`].
    pub async fn join_session(
        &self,
        candidate: SessionCandidate,
    ) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Join { candidate, reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    pub async fn start_session(&self) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Start { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    pub async fn destroy_session(&self) -> Result<(), CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Destroy { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)?
    }

    /// Subscribes to the coordinator's events.
    pub async fn subscribe(&self) -> Result<Subscription, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Subscribe { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    pub async fn unsubscribe(&self, id: SubscriptionId) -> Result<bool, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Unsubscribe { id, reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    pub async fn status(&self) -> Result<CoordinatorStatus, CoordinatorError> {
        let (reply, rx) = oneshot::channel();
        self.send(CoordinatorCommand::Status { reply }).await?;
        rx.await.map_err(|_| CoordinatorError::Unavailable)
    }

    /// Stops the actor. Pending operations are abandoned.
    pub async fn shutdown(&self) -> Result<(), CoordinatorError> {
        self.send(CoordinatorCommand::Shutdown).await
    }

    /// `true` once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: CoordinatorCommand) -> Result<(), CoordinatorError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| CoordinatorError::Unavailable)
    }
}

struct CoordinatorActor<P, C> {
    coordinator: SessionCoordinator<P, C>,
    commands: mpsc::Receiver<CoordinatorCommand>,
    completions: CompletionReceiver,
}

impl<P: SessionProvider, C: LocalUserContext> CoordinatorActor<P, C> {
    async fn run(mut self) {
        tracing::info!(
            backend = self.coordinator.provider().map(|p| p.backend_name()).unwrap_or("none"),
            "coordinator actor started"
        );

        let mut sweep = self.coordinator.config().operation_timeout().map(|_| {
            let mut interval = tokio::time::interval(self.coordinator.config().sweep_interval());
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        let mut completions_open = true;

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(CoordinatorCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                completion = self.completions.recv(), if completions_open => match completion {
                    Some(completion) => self.coordinator.handle_completion(completion),
                    None => {
                        tracing::debug!("completion channel closed");
                        completions_open = false;
                    }
                },
                _ = next_sweep(&mut sweep) => {
                    let expired = self.coordinator.expire_stale();
                    if !expired.is_empty() {
                        tracing::debug!(?expired, "expired stale operations");
                    }
                }
            }
        }

        tracing::info!("coordinator actor stopped");
    }

    fn handle_command(&mut self, command: CoordinatorCommand) {
        match command {
            CoordinatorCommand::Create { request, reply } => {
                let _ = reply.send(self.coordinator.create_session(request));
            }
            CoordinatorCommand::Find { request, reply } => {
                let _ = reply.send(self.coordinator.find_session(request));
            }
            CoordinatorCommand::Join { candidate, reply } => {
                let _ = reply.send(self.coordinator.join_session(&candidate));
            }
            CoordinatorCommand::Start { reply } => {
                let _ = reply.send(self.coordinator.start_session());
            }
            CoordinatorCommand::Destroy { reply } => {
                let _ = reply.send(self.coordinator.destroy_session());
            }
            CoordinatorCommand::Subscribe { reply } => {
                let _ = reply.send(self.coordinator.subscribe());
            }
            CoordinatorCommand::Unsubscribe { id, reply } => {
                let _ = reply.send(self.coordinator.unsubscribe(id));
            }
            CoordinatorCommand::Status { reply } => {
                let _ = reply.send(self.coordinator.status());
            }
            CoordinatorCommand::Shutdown => {}
        }
    }
}

/// Ticks `sweep` if there is one, otherwise never completes.
async fn next_sweep(sweep: &mut Option<Interval>) {
    match sweep {
        Some(interval) => {
            interval.tick().await;
        }
        None => future::pending::<()>().await,
    }
}

/// Spawns a coordinator actor and returns a handle to it.
///
/// `completions` must be the receiving half of the channel the
/// coordinator's provider delivers completions on.
pub fn spawn_coordinator<P: SessionProvider, C: LocalUserContext>(
    coordinator: SessionCoordinator<P, C>,
    completions: CompletionReceiver,
) -> CoordinatorHandle {
    let (sender, commands) = mpsc::channel(coordinator.config().command_channel_size.max(1));
    let actor = CoordinatorActor {
        coordinator,
        commands,
        completions,
    };
    tokio::spawn(actor.run());
    CoordinatorHandle { sender }
}
