//! Integration tests for EventSubscriptionManager against a scripted transport

mod fixtures;

use are_rest_core::{
    Error, EventCategory, EventSubscriptionManager, SessionState, StreamErrorKind,
    Subscription, SubscriptionItem, SubscriptionRegistry, TransportSignal,
};
use fixtures::mock_event_transport::MockEventTransport;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

const BASE: &str = "http://localhost:8081/rest/";

fn manager_with(transport: Arc<MockEventTransport>) -> EventSubscriptionManager {
    EventSubscriptionManager::new(BASE, transport, SubscriptionRegistry::new())
}

async fn next(subscription: &mut Subscription) -> Option<SubscriptionItem> {
    tokio::time::timeout(Duration::from_secs(2), subscription.next_item())
        .await
        .expect("timed out waiting for subscription item")
}

#[tokio::test]
async fn test_events_are_forwarded_in_order() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager
        .subscribe(EventCategory::ModelStateChanged, None)
        .unwrap();
    assert_eq!(
        transport.log(),
        vec!["open http://localhost:8081/rest/runtime/model/state/listener"]
    );

    transport.signal(0, TransportSignal::Opened);
    for payload in ["started", "paused", "stopped"] {
        transport.event(0, payload);
    }

    for payload in ["started", "paused", "stopped"] {
        let event = next(&mut sub).await.unwrap().unwrap();
        assert_eq!(event.payload, payload);
        assert_eq!(event.status, 200);
    }

    let snapshot = manager
        .registry()
        .peek(EventCategory::ModelStateChanged)
        .unwrap();
    assert_eq!(snapshot.state, SessionState::Open);
    assert_eq!(snapshot.id, sub.session_id());
}

#[tokio::test]
async fn test_resubscribe_closes_old_session_before_opening_new() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut first = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    let second = manager.subscribe(EventCategory::ModelChanged, None).unwrap();

    let url = "http://localhost:8081/rest/runtime/deployment/listener";
    assert_eq!(
        transport.log(),
        vec![
            format!("open {}", url),
            format!("close {}", url),
            format!("open {}", url),
        ]
    );

    let registry = manager.registry();
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.peek(EventCategory::ModelChanged).unwrap().id,
        second.session_id()
    );
    assert_ne!(first.session_id(), second.session_id());

    // The replaced subscription ends and never sees the old connection again
    transport.event(0, "stale");
    assert!(next(&mut first).await.is_none());
}

#[tokio::test]
async fn test_unsubscribe_without_subscription() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    assert!(!manager.unsubscribe(EventCategory::PropertyChanged));
    assert!(!manager.close_event_source(EventCategory::PropertyChanged));
    assert!(transport.log().is_empty());
}

#[tokio::test]
async fn test_unsubscribe_is_idempotent() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager
        .subscribe(EventCategory::EventChannelTransmission, None)
        .unwrap();

    assert!(manager.unsubscribe(EventCategory::EventChannelTransmission));
    assert!(!manager.unsubscribe(EventCategory::EventChannelTransmission));

    assert_eq!(transport.log().len(), 2);
    assert!(transport.log()[1].starts_with("close "));
    assert!(manager.registry().is_empty());
    assert!(next(&mut sub).await.is_none());
}

#[tokio::test]
async fn test_data_channel_without_id_does_nothing() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    for channel_id in [None, Some("")] {
        let err = manager
            .subscribe(EventCategory::DataChannelTransmission, channel_id)
            .unwrap_err();
        assert!(matches!(err, Error::MissingParameter("channel_id")));
    }

    assert_eq!(transport.open_count(), 0);
    assert!(manager.registry().is_empty());
}

#[tokio::test]
async fn test_data_channel_id_is_encoded_in_url() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    manager
        .subscribe(EventCategory::DataChannelTransmission, Some("AB"))
        .unwrap();

    assert_eq!(
        transport.log(),
        vec!["open http://localhost:8081/rest/runtime/model/channels/data/65-66-/listener"]
    );
}

#[tokio::test]
async fn test_unknown_category_is_configuration_error() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let err = manager.subscribe_named("model_exploded", None).unwrap_err();
    assert!(matches!(err, Error::UnknownCategory(ref name) if name == "model_exploded"));
    assert_eq!(transport.open_count(), 0);

    // Known names still work
    manager.subscribe_named("property_changed", None).unwrap();
    assert_eq!(transport.open_count(), 1);
}

#[tokio::test]
async fn test_streaming_unsupported_fails_before_connecting() {
    let transport = Arc::new(MockEventTransport::without_streaming());
    let manager = manager_with(transport.clone());

    let err = manager
        .subscribe(EventCategory::ModelChanged, None)
        .unwrap_err();
    assert!(matches!(err, Error::StreamingUnsupported));
    assert_eq!(transport.open_count(), 0);
}

#[tokio::test]
async fn test_failed_open_is_reported_and_not_registered() {
    let transport = Arc::new(MockEventTransport::failing());
    let manager = manager_with(transport.clone());

    let err = manager
        .subscribe(EventCategory::ModelChanged, None)
        .unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert!(manager.registry().is_empty());
}

#[tokio::test]
async fn test_reconnecting_keeps_session_registered() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    transport.signal(0, TransportSignal::Opened);
    transport.signal(0, TransportSignal::Connecting);

    let err = next(&mut sub).await.unwrap().unwrap_err();
    assert_eq!((err.status, err.reason()), (400, "reconnecting"));
    assert_eq!(err.kind, StreamErrorKind::Reconnecting);

    let snapshot = manager.registry().peek(EventCategory::ModelChanged).unwrap();
    assert_eq!(snapshot.state, SessionState::Erroring);

    // The transport recovers on its own and events resume
    transport.signal(0, TransportSignal::Opened);
    transport.event(0, "<model/>");
    assert_eq!(next(&mut sub).await.unwrap().unwrap().payload, "<model/>");
}

#[tokio::test]
async fn test_transport_close_reports_connection_lost_and_deregisters() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    transport.signal(0, TransportSignal::Opened);
    transport.signal(0, TransportSignal::Closed);

    let err = next(&mut sub).await.unwrap().unwrap_err();
    assert_eq!((err.status, err.reason()), (400, "connectionLost"));

    // Stream ends once the session is gone
    assert!(next(&mut sub).await.is_none());
    assert!(manager.registry().peek(EventCategory::ModelChanged).is_none());
    assert!(!manager.unsubscribe(EventCategory::ModelChanged));
}

#[tokio::test]
async fn test_close_before_install_still_deregisters() {
    let transport = Arc::new(MockEventTransport::closing_immediately());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    let err = next(&mut sub).await.unwrap().unwrap_err();
    assert_eq!(err.kind, StreamErrorKind::ConnectionLost);
    assert!(next(&mut sub).await.is_none());
    assert!(manager.registry().is_empty());
}

#[tokio::test]
async fn test_stale_close_does_not_remove_replacement() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let _first = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    let mut second = manager.subscribe(EventCategory::ModelChanged, None).unwrap();

    // A late close from the first connection must not touch the second session
    transport.signal(0, TransportSignal::Closed);
    transport.event(1, "fresh");

    assert_eq!(next(&mut second).await.unwrap().unwrap().payload, "fresh");
    assert_eq!(
        manager.registry().peek(EventCategory::ModelChanged).unwrap().id,
        second.session_id()
    );
}

#[tokio::test]
async fn test_fault_is_reported_without_state_change() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::PropertyChanged, None).unwrap();
    transport.signal(0, TransportSignal::Opened);
    transport.signal(0, TransportSignal::Fault("invalid utf-8".to_string()));

    let err = next(&mut sub).await.unwrap().unwrap_err();
    assert_eq!(err.reason(), "someErrorOccurred");
    assert_eq!(
        manager.registry().peek(EventCategory::PropertyChanged).unwrap().state,
        SessionState::Open
    );
}

#[tokio::test]
async fn test_other_event_names_are_not_delivered() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    transport.signal(
        0,
        TransportSignal::Message {
            event: "message".to_string(),
            data: "heartbeat".to_string(),
            id: String::new(),
        },
    );
    transport.event(0, "real");

    assert_eq!(next(&mut sub).await.unwrap().unwrap().payload, "real");
}

#[tokio::test]
async fn test_categories_are_independent() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut models = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    let mut properties = manager.subscribe(EventCategory::PropertyChanged, None).unwrap();
    assert_eq!(manager.registry().len(), 2);

    transport.event(1, "property");
    transport.event(0, "model");

    assert_eq!(next(&mut models).await.unwrap().unwrap().payload, "model");
    assert_eq!(next(&mut properties).await.unwrap().unwrap().payload, "property");

    assert!(manager.unsubscribe(EventCategory::ModelChanged));
    assert!(manager.registry().contains(EventCategory::PropertyChanged));
}

#[tokio::test]
async fn test_close_all_closes_every_session() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    for category in [
        EventCategory::ModelChanged,
        EventCategory::ModelStateChanged,
        EventCategory::EventChannelTransmission,
    ] {
        manager.subscribe(category, None).unwrap();
    }

    assert_eq!(manager.close_all(), 3);
    assert!(manager.registry().is_empty());
    let closes = transport
        .log()
        .iter()
        .filter(|entry| entry.starts_with("close "))
        .count();
    assert_eq!(closes, 3);
}

#[tokio::test]
async fn test_dropping_registry_closes_sessions() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    drop(manager);

    assert!(transport.log()[1].starts_with("close "));
    assert!(next(&mut sub).await.is_none());
}

#[tokio::test]
async fn test_subscription_is_a_stream() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    transport.event(0, "a");
    transport.event(0, "b");
    transport.signal(0, TransportSignal::Closed);

    let items: Vec<SubscriptionItem> =
        tokio::time::timeout(Duration::from_secs(2), sub.collect())
            .await
            .unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0].as_ref().unwrap().payload, "a");
    assert_eq!(items[1].as_ref().unwrap().payload, "b");
    assert_eq!(
        items[2].as_ref().unwrap_err().kind,
        StreamErrorKind::ConnectionLost
    );
}

#[tokio::test]
async fn test_no_item_pending_without_signals() {
    let transport = Arc::new(MockEventTransport::new());
    let manager = manager_with(transport.clone());

    let mut sub = manager.subscribe(EventCategory::ModelChanged, None).unwrap();
    transport.signal(0, TransportSignal::Opened);
    tokio::task::yield_now().await;

    let mut pending = tokio_test::task::spawn(sub.next_item());
    tokio_test::assert_pending!(pending.poll());
}
