use huddle_core::{ClientEvent, ErrorKind, ServerEvent};

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_send_broadcasts_to_room() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;
    let carol = connect_and_join(&hub, "carol", "elsewhere").await;

    hub.handle(
        alice,
        ClientEvent::SendMessage {
            room: room("global"),
            text: Some("  hi  ".to_owned()),
            attachment: None,
            client_id: Some("tmp-1".to_owned()),
        },
    )
    .await;

    for member in [alice, bob] {
        let Some(ServerEvent::NewMessage(posted)) = sink.events_for(&member).await.pop() else {
            panic!("{member} did not receive new_message");
        };
        assert_eq!(posted.message.sender, "alice");
        assert_eq!(posted.message.text.as_deref(), Some("hi"));
        assert_eq!(posted.message.room, room("global"));
        assert_eq!(posted.client_id.as_deref(), Some("tmp-1"));
    }
    assert_eq!(sink.count_named(&carol, "new_message").await, 0);

    let history = hub.history(&room("global"), None).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].text.as_deref(), Some("hi"));
}

#[tokio::test]
async fn test_empty_message_is_rejected_without_broadcast() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;

    hub.handle(
        alice,
        ClientEvent::SendMessage {
            room: room("global"),
            text: Some(String::new()),
            attachment: None,
            client_id: None,
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
    assert_eq!(sink.count_named(&alice, "new_message").await, 0);
    assert_eq!(sink.count_named(&bob, "new_message").await, 0);
    assert!(hub.history(&room("global"), None).await.is_empty());
}

#[tokio::test]
async fn test_attachment_only_message_is_accepted() {
    init_tracing();

    let (hub, _sink) = create_test_hub();
    let alice = connect_and_join(&hub, "alice", "global").await;

    let message = hub
        .send_message(
            alice,
            &room("global"),
            None,
            Some("/uploads/20240101_voice.webm".to_owned()),
            None,
        )
        .await
        .unwrap();

    assert_eq!(message.text, None);
    assert_eq!(
        message.attachment.as_deref(),
        Some("/uploads/20240101_voice.webm")
    );
}
