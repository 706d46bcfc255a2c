//! Integration tests for events

use pkgrelay_events::{channel, AppEvent, EventEmitter, GeneralEvent};

#[tokio::test]
async fn emitter_helpers_deliver_in_order() {
    let (tx, mut rx) = channel();

    tx.emit_error("test error");
    tx.emit_debug("test debug");

    let event1 = rx.recv().await.unwrap();
    assert!(matches!(
        event1,
        AppEvent::General(GeneralEvent::Error { .. })
    ));

    let event2 = rx.recv().await.unwrap();
    assert!(matches!(
        event2,
        AppEvent::General(GeneralEvent::DebugLog { .. })
    ));
}

#[tokio::test]
async fn dropped_receiver_does_not_panic() {
    let (tx, rx) = channel();
    drop(rx);

    tx.emit_warning("ignored");
}

#[test]
fn events_serialize_with_domain_tag() {
    let event = AppEvent::General(GeneralEvent::warning("careful"));
    let json = serde_json::to_string(&event).unwrap();
    assert!(json.contains(r#""domain":"General""#));
    assert!(json.contains(r#""type":"Warning""#));
}

#[test]
fn missing_sender_is_a_noop() {
    let sender: Option<pkgrelay_events::EventSender> = None;
    sender.emit_warning("dropped on the floor");
}
