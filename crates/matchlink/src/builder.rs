//! `MatchlinkBuilder`: wires a provider, a context, and a config into a
//! running coordinator.

use std::path::Path;

use matchlink_coordinator::{
    spawn_coordinator, CoordinatorConfig, CoordinatorHandle, SessionCoordinator,
};
use matchlink_provider::{
    completion_channel, CompletionSender, LocalNetwork, LocalProvider,
    LocalUserContext, SessionProvider, StaticContext,
};
use matchlink_types::LocalUser;

use crate::{load_config, MatchlinkError};

/// Builder for configuring and spawning a session coordinator.
///
/// # Example
///
/// ```rust,ignore
/// use matchlink::prelude::*;
///
/// let network = LocalNetwork::new();
/// let handle = MatchlinkBuilder::new()
///     .operation_timeout(30)
///     .spawn_local(&network, LocalUser::new(1, "host"))?;
/// handle.create_session(CreateSessionRequest::new("GameSession", 4)).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatchlinkBuilder {
    config: CoordinatorConfig,
}

impl MatchlinkBuilder {
    /// Creates a builder with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole config.
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Loads the config from a JSON file.
    pub fn config_file(mut self, path: impl AsRef<Path>) -> Result<Self, MatchlinkError> {
        self.config = load_config(path)?;
        Ok(self)
    }

    /// Fails operations that get no completion within `secs` seconds.
    pub fn operation_timeout(mut self, secs: u64) -> Self {
        self.config.operation_timeout_secs = Some(secs);
        self
    }

    /// Builds an unspawned coordinator, for callers that drive
    /// completions themselves.
    pub fn build<P: SessionProvider, C: LocalUserContext>(
        self,
        provider: P,
        context: C,
    ) -> Result<SessionCoordinator<P, C>, MatchlinkError> {
        let config = self.config.validated()?;
        Ok(SessionCoordinator::new(provider, context, config))
    }

    /// Spawns a coordinator task.
    ///
    /// `make_provider` receives the sender the provider must deliver its
    /// completions on. Must be called inside a Tokio runtime.
    pub fn spawn<P, C, F>(self, context: C, make_provider: F) -> Result<CoordinatorHandle, MatchlinkError>
    where
        P: SessionProvider,
        C: LocalUserContext,
        F: FnOnce(CompletionSender) -> P,
    {
        let (tx, rx) = completion_channel();
        let coordinator = self.build(make_provider(tx), context)?;
        Ok(spawn_coordinator(coordinator, rx))
    }

    /// Spawns a coordinator for `user` on an in-memory LAN.
    pub fn spawn_local(
        self,
        network: &LocalNetwork,
        user: LocalUser,
    ) -> Result<CoordinatorHandle, MatchlinkError> {
        self.spawn(StaticContext::signed_in(user), |tx| {
            LocalProvider::new(network.clone(), tx)
        })
    }
}

#[cfg(test)]
mod tests {
    use matchlink_coordinator::ConfigError;

    use super::*;

    #[test]
    fn test_operation_timeout_sets_config() {
        let builder = MatchlinkBuilder::new().operation_timeout(15);
        assert_eq!(builder.config.operation_timeout_secs, Some(15));
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let (tx, _rx) = completion_channel();
        let result = MatchlinkBuilder::new()
            .config(CoordinatorConfig {
                command_channel_size: 0,
                ..CoordinatorConfig::default()
            })
            .build(
                LocalProvider::new(LocalNetwork::new(), tx),
                StaticContext::signed_out(),
            );
        assert!(matches!(
            result,
            Err(MatchlinkError::Config(ConfigError::Invalid(_)))
        ));
    }
}
