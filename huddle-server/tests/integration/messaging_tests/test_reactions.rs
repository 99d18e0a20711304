use huddle_core::{ClientEvent, ErrorKind, Message, ServerEvent};
use huddle_server::Hub;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

async fn post(hub: &Hub, from: huddle_core::ConnectionId) -> Message {
    hub.send_message(from, &room("global"), Some("react to me".to_owned()), None, None)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_toggle_twice_nets_to_nothing() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;
    let message = post(&hub, alice).await;

    let toggle = ClientEvent::ToggleReaction {
        msg_id: message.id,
        emoji: "👍".to_owned(),
    };

    hub.handle(bob, toggle.clone()).await;
    let Some(ServerEvent::ReactionUpdate { id, reactions, .. }) = sink.events_for(&alice).await.pop()
    else {
        panic!("expected reaction_update");
    };
    assert_eq!(id, message.id);
    assert_eq!(reactions.count("👍"), 1);

    hub.handle(bob, toggle).await;
    let Some(ServerEvent::ReactionUpdate { reactions, .. }) = sink.events_for(&bob).await.pop()
    else {
        panic!("expected reaction_update");
    };
    assert!(reactions.is_empty());
    assert_eq!(sink.count_named(&alice, "reaction_update").await, 2);
}

#[tokio::test]
async fn test_toggles_from_different_users_commute() {
    init_tracing();

    let (hub, _sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;
    let first = post(&hub, alice).await;
    let second = post(&hub, alice).await;

    hub.toggle_reaction(alice, first.id, "🎉".to_owned()).await.unwrap();
    let left = hub.toggle_reaction(bob, first.id, "🎉".to_owned()).await.unwrap();

    hub.toggle_reaction(bob, second.id, "🎉".to_owned()).await.unwrap();
    let right = hub.toggle_reaction(alice, second.id, "🎉".to_owned()).await.unwrap();

    assert_eq!(left.reactions, right.reactions);
    assert_eq!(left.reactions.count("🎉"), 2);
}

#[tokio::test]
async fn test_invalid_emoji_is_rejected() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let message = post(&hub, alice).await;

    hub.handle(
        alice,
        ClientEvent::ToggleReaction {
            msg_id: message.id,
            emoji: String::new(),
        },
    )
    .await;

    assert!(matches!(
        sink.events_for(&alice).await.last(),
        Some(ServerEvent::Error {
            kind: ErrorKind::Validation,
            ..
        })
    ));
    assert_eq!(sink.count_named(&alice, "reaction_update").await, 0);
}
