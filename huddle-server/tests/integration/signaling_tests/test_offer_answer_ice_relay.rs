use huddle_core::{ClientEvent, ErrorKind, ServerEvent};
use serde_json::json;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_offer_answer_ice_relay() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let a = connect_and_join(&hub, "alice", "R1").await;
    let b = connect_and_join(&hub, "bob", "R1").await;
    let outsider = connect_and_join(&hub, "carol", "R2").await;
    sink.clear().await;

    let offer = json!({ "type": "offer", "sdp": "v=0 a" });
    hub.handle(
        a,
        ClientEvent::Offer {
            room: room("R1"),
            target: None,
            offer: offer.clone(),
        },
    )
    .await;

    assert_eq!(
        sink.events_for(&b).await,
        vec![ServerEvent::Offer {
            room: room("R1"),
            from: a,
            offer,
        }]
    );
    assert!(sink.events_for(&a).await.is_empty());

    let answer = json!({ "type": "answer", "sdp": "v=0 b" });
    hub.handle(
        b,
        ClientEvent::Answer {
            room: room("R1"),
            target: Some(a),
            answer: answer.clone(),
        },
    )
    .await;
    assert_eq!(
        sink.events_for(&a).await,
        vec![ServerEvent::Answer {
            room: room("R1"),
            from: b,
            answer,
        }]
    );

    let candidate = json!({ "candidate": "candidate:0 1 UDP 1 192.0.2.1 5000 typ host" });
    for (from, to) in [(a, b), (b, a)] {
        hub.handle(
            from,
            ClientEvent::IceCandidate {
                room: room("R1"),
                target: None,
                candidate: candidate.clone(),
            },
        )
        .await;
        assert_eq!(
            sink.events_for(&to).await.last(),
            Some(&ServerEvent::IceCandidate {
                room: room("R1"),
                from,
                candidate: candidate.clone(),
            })
        );
    }

    assert_eq!(sink.events_for(&a).await.len(), 2);
    assert_eq!(sink.events_for(&b).await.len(), 2);
    assert!(sink.events_for(&outsider).await.is_empty());
}

#[tokio::test]
async fn test_answer_without_offer_is_a_state_conflict() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let a = connect_and_join(&hub, "alice", "R1").await;
    let b = connect_and_join(&hub, "bob", "R1").await;
    sink.clear().await;

    hub.handle(
        b,
        ClientEvent::Answer {
            room: room("R1"),
            target: None,
            answer: json!({}),
        },
    )
    .await;

    assert!(matches!(
        sink.events_for(&b).await.as_slice(),
        [ServerEvent::Error {
            kind: ErrorKind::StateConflict,
            ..
        }]
    ));
    assert!(sink.events_for(&a).await.is_empty());
}

#[tokio::test]
async fn test_hang_up_notifies_other_party() {
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

    hub.handle(b, ClientEvent::EndCall { room: room("R1") }).await;

    assert_eq!(
        sink.events_for(&a).await,
        vec![ServerEvent::EndCall {
            room: room("R1"),
            reason: huddle_core::EndReason::HangUp,
        }]
    );
    assert!(sink.events_for(&b).await.is_empty());
}
