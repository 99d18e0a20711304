use huddle_core::{ClientEvent, ConnectionId, ServerEvent};
use serde_json::json;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

fn offer_from(tag: &str) -> ClientEvent {
    ClientEvent::Offer {
        room: room("R1"),
        target: None,
        offer: json!({ "sdp": tag }),
    }
}

#[tokio::test]
async fn test_glare_resolution() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let a = connect_and_join(&hub, "alice", "R1").await;
    let b = connect_and_join(&hub, "bob", "R1").await;
    sink.clear().await;

    let (low, high) = if a < b { (a, b) } else { (b, a) };

    // The higher id offers first, then the lower id collides with it.
    hub.handle(high, offer_from("high")).await;
    hub.handle(low, offer_from("low")).await;

    assert_eq!(
        sink.events_for(&high).await,
        vec![
            ServerEvent::CallGlare {
                room: room("R1"),
                winner: low,
            },
            ServerEvent::Offer {
                room: room("R1"),
                from: low,
                offer: json!({ "sdp": "low" }),
            },
        ]
    );
    assert_eq!(
        sink.events_for(&low).await,
        vec![ServerEvent::Offer {
            room: room("R1"),
            from: high,
            offer: json!({ "sdp": "high" }),
        }]
    );

    // The loser answers the winner's offer.
    hub.handle(
        high,
        ClientEvent::Answer {
            room: room("R1"),
            target: Some(low),
            answer: json!({}),
        },
    )
    .await;
    assert_eq!(sink.names_for(&low).await, vec!["offer", "answer"]);
}

#[tokio::test]
async fn test_glare_loser_offer_is_discarded() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let a = connect_and_join(&hub, "alice", "R1").await;
    let b = connect_and_join(&hub, "bob", "R1").await;
    sink.clear().await;

    let (low, high): (ConnectionId, ConnectionId) = if a < b { (a, b) } else { (b, a) };

    hub.handle(low, offer_from("low")).await;
    hub.handle(high, offer_from("high")).await;

    assert_eq!(
        sink.events_for(&high).await,
        vec![
            ServerEvent::Offer {
                room: room("R1"),
                from: low,
                offer: json!({ "sdp": "low" }),
            },
            ServerEvent::CallGlare {
                room: room("R1"),
                winner: low,
            },
        ]
    );
    // The winner never sees the losing offer.
    assert!(sink.events_for(&low).await.is_empty());
}
