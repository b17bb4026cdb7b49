//! LAN lobby demo: one host and two guests on an in-memory network.
//!
//! The host advertises a "Deathmatch" session with room for one guest.
//! Both guests search, pick the first matching result, and join. The
//! first travels to the host, the second is told the session is full.
//! The host then starts and tears down the session.
//!
//! Run with `RUST_LOG=debug cargo run -p lan-lobby` to see every step.

use std::time::Duration;

use matchlink::prelude::*;

const MATCH_TYPE: &str = "Deathmatch";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let network = LocalNetwork::new();
    let builder = MatchlinkBuilder::new().operation_timeout(10);

    let host = builder.clone().spawn_local(&network, LocalUser::new(1, "host"))?;
    let mut host_events = host.subscribe().await?;
    host.create_session(CreateSessionRequest::new("GameSession", 2).match_type(MATCH_TYPE))
        .await?;
    match next_event(&mut host_events).await {
        Some(SessionEvent::CreateCompleted { success: true }) => {
            tracing::info!(match_type = MATCH_TYPE, "lobby open");
        }
        other => return Err(format!("host could not create the lobby: {other:?}").into()),
    }

    for (id, name) in [(2, "alice"), (3, "bob")] {
        let guest = builder.clone().spawn_local(&network, LocalUser::new(id, name))?;
        join_first_match(&guest, name).await?;
    }

    host.start_session().await?;
    next_event(&mut host_events).await;
    host.destroy_session().await?;
    next_event(&mut host_events).await;

    let status = host.status().await?;
    tracing::info!(phase = %status.phase, sessions = network.session_count(), "lobby closed");
    host.shutdown().await?;
    Ok(())
}

async fn join_first_match(guest: &CoordinatorHandle, name: &str) -> Result<(), MatchlinkError> {
    let mut events = guest.subscribe().await?;
    guest
        .find_session(FindSessionRequest::default().match_type(MATCH_TYPE))
        .await?;

    let candidate = match next_event(&mut events).await {
        Some(SessionEvent::FindCompleted { results, success: true }) => {
            results.first_matching(MATCH_TYPE).cloned()
        }
        _ => None,
    };
    let Some(candidate) = candidate else {
        tracing::warn!(guest = name, "no {MATCH_TYPE} lobby found");
        return Ok(());
    };

    guest.join_session(candidate).await?;
    while let Some(event) = next_event(&mut events).await {
        match event {
            SessionEvent::JoinCompleted { result } if !result.is_success() => {
                tracing::warn!(guest = name, %result, "join refused");
                break;
            }
            SessionEvent::TravelRequested { address } => {
                tracing::info!(guest = name, %address, "travelling to lobby");
                break;
            }
            _ => {}
        }
    }
    Ok(())
}

async fn next_event(sub: &mut Subscription) -> Option<SessionEvent> {
    tokio::time::timeout(Duration::from_secs(2), sub.recv())
        .await
        .ok()
        .flatten()
}
