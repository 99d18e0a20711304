use huddle_core::{ClientEvent, EndReason, ServerEvent};
use serde_json::json;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_disconnect_ends_call() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let a = connect_and_join(&hub, "alice", "R1").await;
    let b = connect_and_join(&hub, "bob", "R1").await;

    hub.handle(
        a,
        ClientEvent::Offer {
            room: room("R1"),
            target: None,
            offer: json!({}),
        },
    )
    .await;
    hub.handle(
        b,
        ClientEvent::Answer {
            room: room("R1"),
            target: None,
            answer: json!({}),
        },
    )
    .await;
    sink.clear().await;

    hub.disconnect(a).await;

    assert_eq!(
        sink.events_for(&b).await,
        vec![
            ServerEvent::EndCall {
                room: room("R1"),
                reason: EndReason::PeerLeft,
            },
            ServerEvent::UserLeft {
                room: room("R1"),
                username: "alice".to_owned(),
            },
        ]
    );

    // The room is idle again: a fresh offer from bob starts a new call.
    let c = connect_and_join(&hub, "carol", "R1").await;
    sink.clear().await;
    hub.handle(
        b,
        ClientEvent::Offer {
            room: room("R1"),
            target: Some(c),
            offer: json!({}),
        },
    )
    .await;
    assert_eq!(sink.names_for(&c).await, vec!["offer"]);
    assert!(sink.events_for(&b).await.is_empty());
}
