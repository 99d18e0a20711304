use huddle_core::{ClientEvent, ErrorKind, ServerEvent};

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect, connect_and_join};

#[tokio::test]
async fn test_status_reaches_every_room() {
    init_tracing();

    let (hub, sink) = create_test_hub();
    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "lobby").await;
    let carol = connect(&hub, "carol").await;
    sink.clear().await;

    hub.handle(
        alice,
        ClientEvent::SetStatus {
            status: "  in a meeting ".to_owned(),
        },
    )
    .await;

    for id in [alice, bob, carol] {
        let events = sink.events_for(&id).await;
        assert!(
            matches!(
                events.as_slice(),
                [ServerEvent::StatusUpdate(status)]
                    if status.username == "alice" && status.status == "in a meeting"
            ),
            "unexpected events for {}: {:?}",
            id,
            events
        );
    }
    assert_eq!(hub.statuses().get("alice").unwrap().status, "in a meeting");
}

#[tokio::test]
async fn test_overlong_status_is_rejected_to_sender_only() {
    init_tracing();

    let (hub, sink) = create_test_hub();
    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;
    sink.clear().await;

    hub.handle(
        alice,
        ClientEvent::SetStatus {
            status: "x".repeat(141),
        },
    )
    .await;

    assert!(matches!(
        sink.events_for(&alice).await.as_slice(),
        [ServerEvent::Error {
            kind: ErrorKind::Validation,
            ..
        }]
    ));
    assert!(sink.events_for(&bob).await.is_empty());
    assert!(hub.statuses().get("alice").is_none());
}
