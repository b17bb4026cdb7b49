//! Integration tests for the builder, config loading, and a full lobby
//! round trip through the prelude.

use std::path::PathBuf;
use std::time::Duration;

use matchlink::prelude::*;

fn temp_config_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("matchlink-{}-{name}.json", std::process::id()))
}

async fn next_event(sub: &mut Subscription) -> SessionEvent {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event within a second")
        .expect("coordinator alive")
}

#[test]
fn test_load_config_reads_file() {
    let path = temp_config_path("valid");
    let config = CoordinatorConfig {
        operation_timeout_secs: Some(20),
        ..CoordinatorConfig::default()
    };
    std::fs::write(&path, serde_json::to_string(&config).expect("serializes"))
        .expect("write config");

    let loaded = load_config(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.expect("valid config"), config);
}

#[test]
fn test_load_config_missing_file_is_io_error() {
    let result = load_config(temp_config_path("does-not-exist"));
    assert!(matches!(result, Err(MatchlinkError::Io(_))));
}

#[test]
fn test_config_file_invalid_values_is_config_error() {
    let path = temp_config_path("invalid");
    std::fs::write(&path, r#"{ "sweep_interval_ms": 0 }"#).expect("write config");

    let result = MatchlinkBuilder::new().config_file(&path);
    let _ = std::fs::remove_file(&path);

    assert!(matches!(result, Err(MatchlinkError::Config(_))));
}

#[tokio::test]
async fn test_spawn_local_host_and_guest_meet() {
    let network = LocalNetwork::new();
    let host = MatchlinkBuilder::new()
        .spawn_local(&network, LocalUser::new(1, "host"))
        .expect("host spawned");
    let guest = MatchlinkBuilder::new()
        .operation_timeout(30)
        .spawn_local(&network, LocalUser::new(2, "guest"))
        .expect("guest spawned");

    let mut host_events = host.subscribe().await.expect("subscribed");
    host.create_session(CreateSessionRequest::new("GameSession", 4).match_type("CaptureTheFlag"))
        .await
        .expect("create accepted");
    assert_eq!(
        next_event(&mut host_events).await,
        SessionEvent::CreateCompleted { success: true }
    );

    let mut guest_events = guest.subscribe().await.expect("subscribed");
    guest
        .find_session(FindSessionRequest::default().match_type("CaptureTheFlag"))
        .await
        .expect("find accepted");
    let SessionEvent::FindCompleted { results, success: true } = next_event(&mut guest_events).await
    else {
        panic!("expected a successful find");
    };
    assert!(results.first_matching("FreeForAll").is_none());
    let candidate = results.first_matching("CaptureTheFlag").cloned().expect("found");

    guest.join_session(candidate).await.expect("join accepted");
    assert_eq!(
        next_event(&mut guest_events).await,
        SessionEvent::JoinCompleted { result: JoinResult::Success }
    );
    assert!(matches!(
        next_event(&mut guest_events).await,
        SessionEvent::TravelRequested { .. }
    ));
}

#[tokio::test]
async fn test_operation_error_converts_to_matchlink_error() {
    async fn start(handle: &CoordinatorHandle) -> Result<(), MatchlinkError> {
        handle.start_session().await?;
        Ok(())
    }

    let network = LocalNetwork::new();
    let handle = MatchlinkBuilder::new()
        .spawn_local(&network, LocalUser::new(1, "host"))
        .expect("spawned");

    let err = start(&handle).await.unwrap_err();

    assert!(matches!(
        err,
        MatchlinkError::Coordinator(CoordinatorError::NoSession(_))
    ));
}
