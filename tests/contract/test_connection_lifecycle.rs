//! Contract Tests for the Connection Lifecycle
//!
//! Connect, failure recovery, disconnect and shutdown, both on the
//! connection manager directly and through its actor.

#[path = "../test_utils/mod.rs"]
mod test_utils;

use std::sync::Arc;

use openterm::connection::{self, ConnectionEvent, ConnectionManager, ConnectionState};
use openterm::error::Error;
use openterm::terminal::Terminal;
use tokio::sync::Notify;

use test_utils::{host, Behaviour, MockTerminalFactory, RecordingDisplay};

fn manager(factory: &MockTerminalFactory) -> (ConnectionManager<RecordingDisplay>, RecordingDisplay) {
    let display = RecordingDisplay::new();
    let manager = ConnectionManager::new(
        factory.registry(&["tn3270", "tn5250"]),
        display.clone(),
        "open.term",
    );
    (manager, display)
}

#[tokio::test]
async fn test_connect_binds_then_connects() {
    let factory = MockTerminalFactory::new();
    let (mut manager, display) = manager(&factory);
    let sys1 = host("sys1", 23, "tn3270");

    manager.connect(&sys1).await.unwrap();

    let terminal = &factory.created()[0];
    assert_eq!(terminal.protocol_type(), "tn3270");
    assert_eq!(terminal.last_target(), Some(("sys1".to_string(), 23, false)));
    assert!(terminal.is_connected());

    assert_eq!(display.bound(), vec![terminal.id()]);
    assert_eq!(display.attached_session(), Some(terminal.id()));
    assert_eq!(
        display.titles(),
        vec![
            "open.term - Connecting to sys1:23 (tn3270)".to_string(),
            "open.term - Connected to sys1:23 (tn3270)".to_string(),
        ]
    );
    assert!(matches!(
        manager.state(),
        ConnectionState::Connected { session, .. } if *session == terminal.id()
    ));
}

#[tokio::test]
async fn test_terminal_variant_follows_host_tag() {
    let factory = MockTerminalFactory::new();
    let (mut manager, _display) = manager(&factory);

    manager.connect(&host("sys1", 23, "tn5250")).await.unwrap();
    assert_eq!(factory.created()[0].protocol_type(), "tn5250");
}

#[tokio::test]
async fn test_unknown_protocol_leaves_display_untouched() {
    let factory = MockTerminalFactory::new();
    let (mut manager, display) = manager(&factory);

    let result = manager.connect(&host("sys1", 23, "vt999")).await;

    assert!(matches!(result, Err(Error::UnknownProtocolType { ref tag }) if tag == "vt999"));
    assert_eq!(factory.terminal_count(), 0);
    assert!(display.bound().is_empty());
}

#[tokio::test]
async fn test_failure_is_not_sticky() {
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Fail("connection refused".to_string()));
    let (mut manager, display) = manager(&factory);

    let first = manager.connect(&host("down", 23, "tn3270")).await;
    match first {
        Err(err @ Error::ConnectionFailed { .. }) => {
            assert_eq!(err.user_message(), "connection refused")
        }
        other => panic!("expected connection failure, got {:?}", other),
    }

    // Failed terminal stays bound to the display
    let failed = Arc::clone(&factory.created()[0]);
    assert_eq!(display.attached_session(), Some(failed.id()));
    assert!(matches!(manager.state(), ConnectionState::FailedConnect { .. }));

    manager.connect(&host("up", 23, "tn3270")).await.unwrap();

    let live = &factory.created()[1];
    assert!(live.is_connected());
    assert_eq!(manager.active_session().map(|a| a.id()), Some(live.id()));
    assert_eq!(display.attached_session(), Some(live.id()));
    assert_eq!(
        manager.state().host().map(|h| h.host_name().to_string()),
        Some("up".to_string())
    );
}

#[tokio::test]
async fn test_attach_does_not_disconnect_previous() {
    let factory = MockTerminalFactory::new();
    let (mut manager, _display) = manager(&factory);

    manager.connect(&host("sys1", 23, "tn3270")).await.unwrap();
    manager.connect(&host("sys2", 23, "tn3270")).await.unwrap();

    let created = factory.created();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0].disconnect_calls(), 0);
    assert_ne!(created[0].id(), created[1].id());
}

#[tokio::test]
async fn test_disconnect_is_idempotent() {
    let factory = MockTerminalFactory::new();
    let (mut manager, display) = manager(&factory);

    // Nothing to disconnect yet
    manager.disconnect().await;
    assert_eq!(*manager.state(), ConnectionState::Unattached);
    assert!(display.titles().is_empty());

    manager.connect(&host("sys1", 23, "tn3270")).await.unwrap();
    manager.disconnect().await;
    let after_first = manager.snapshot();
    manager.disconnect().await;

    assert_eq!(manager.snapshot(), after_first);
    assert_eq!(*manager.state(), ConnectionState::Unattached);
    assert!(!factory.created()[0].is_connected());
    assert_eq!(display.last_title().as_deref(), Some("open.term - Not Connected"));
}

#[tokio::test]
async fn test_stale_completion_never_overwrites_newer_session() {
    let factory = MockTerminalFactory::new();
    let gate = Arc::new(Notify::new());
    factory.push(Behaviour::Gated(Arc::clone(&gate)));
    factory.push(Behaviour::Succeed);

    let display = RecordingDisplay::new();
    let (handle, _events, _join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        display.clone(),
        "open.term",
    ));

    let first = handle.submit_connect(host("slow", 23, "tn3270")).unwrap();
    let second = handle.submit_connect(host("fast", 23, "tn3270")).unwrap();

    second.await.unwrap().unwrap();
    gate.notify_one();
    let stale = first.await.unwrap();
    assert!(matches!(stale, Err(Error::Superseded { .. })));

    let created = factory.created();
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.session, Some(created[1].id()));
    assert!(matches!(
        snapshot.state,
        ConnectionState::Connected { ref host, .. } if host.host_name() == "fast"
    ));
    assert_eq!(display.attached_session(), Some(created[1].id()));

    // The replaced session never comes up
    assert!(!created[0].is_connected());
    assert!(created[1].is_connected());
}

#[tokio::test]
async fn test_replaced_connect_is_cancelled() {
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Gated(Arc::new(Notify::new())));
    factory.push(Behaviour::Succeed);

    let (handle, _events, _join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        "open.term",
    ));

    let first = handle.submit_connect(host("slow", 23, "tn3270")).unwrap();
    handle.connect(host("fast", 23, "tn3270")).await.unwrap();

    let created = factory.created();
    assert_eq!(created[0].connect_calls(), 1);
    assert_eq!(created[0].connects_running(), 0);
    assert!(!created[0].is_connected());
    assert!(created[1].is_connected());
    // Only this test and the factory's log still hold the replaced terminal
    assert_eq!(Arc::strong_count(&created[0]), 2);

    assert!(matches!(
        first.await.unwrap(),
        Err(Error::Superseded { ref host }) if host.starts_with("slow")
    ));
}

#[tokio::test]
async fn test_shutdown_cancels_connect_in_flight() {
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Gated(Arc::new(Notify::new())));

    let (handle, _events, join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        "open.term",
    ));

    let pending = handle.submit_connect(host("slow", 23, "tn3270")).unwrap();
    assert!(!handle.shutdown(false).await.unwrap());
    let manager = join.await.unwrap();

    assert!(manager.active_session().is_none());
    assert!(matches!(pending.await.unwrap(), Err(Error::ActorStopped)));

    let created = factory.created();
    assert_eq!(created[0].connects_running(), 0);
    assert!(!created[0].is_connected());
    assert_eq!(Arc::strong_count(&created[0]), 2);
}

#[tokio::test]
async fn test_disconnect_while_connecting_discards_the_connect() {
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Gated(Arc::new(Notify::new())));

    let display = RecordingDisplay::new();
    let (handle, _events, _join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        display.clone(),
        "open.term",
    ));

    let pending = handle.submit_connect(host("slow", 23, "tn3270")).unwrap();
    handle.disconnect().await.unwrap();

    assert!(matches!(pending.await.unwrap(), Err(Error::Superseded { .. })));
    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, ConnectionState::Unattached);
    assert_eq!(display.last_title().as_deref(), Some("open.term - Not Connected"));

    let created = factory.created();
    assert_eq!(created[0].connects_running(), 0);
    assert_eq!(created[0].disconnect_calls(), 1);
    assert!(!created[0].is_connected());
}

#[tokio::test]
async fn test_actor_reports_failure_event() {
    let factory = MockTerminalFactory::new();
    factory.push(Behaviour::Fail("host unreachable".to_string()));

    let (handle, mut events, _join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        "open.term",
    ));

    let result = handle.connect(host("sys1", 23, "tn3270")).await;
    assert!(matches!(result, Err(Error::ConnectionFailed { .. })));

    let mut notices = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let ConnectionEvent::ConnectionFailed { message, .. } = event {
            notices.push(message);
        }
    }
    assert_eq!(notices, vec!["host unreachable".to_string()]);
}

#[tokio::test]
async fn test_connect_via_actor_disconnects_previous_first() {
    let factory = MockTerminalFactory::new();
    let (handle, _events, _join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        "open.term",
    ));

    handle.connect(host("sys1", 23, "tn3270")).await.unwrap();
    handle.connect(host("sys2", 23, "tn3270")).await.unwrap();

    let created = factory.created();
    assert_eq!(created[0].disconnect_calls(), 1);
    assert!(!created[0].is_connected());
    assert!(created[1].is_connected());
}

#[tokio::test]
async fn test_shutdown_distinguishes_embedded_use() {
    let factory = MockTerminalFactory::new();
    let (handle, _events, join) = connection::spawn(ConnectionManager::new(
        factory.registry(&["tn3270"]),
        RecordingDisplay::new(),
        "open.term",
    ));

    handle.connect(host("sys1", 23, "tn3270")).await.unwrap();
    assert!(!handle.shutdown(false).await.unwrap());

    let manager = join.await.unwrap();
    assert!(manager.active_session().is_none());
    assert_eq!(factory.created()[0].disconnect_calls(), 1);
    assert!(matches!(handle.shutdown(true).await, Err(Error::ActorStopped)));

    let mut standalone = manager;
    assert!(standalone.shutdown(true).await);
}
