use huddle_core::{ClientEvent, ErrorKind, HuddleError, ServerEvent};

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_delete_authorization() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;

    let message = hub
        .send_message(alice, &room("global"), Some("M".to_owned()), None, None)
        .await
        .unwrap();

    assert_eq!(
        hub.delete_message("bob", message.id).await,
        Err(HuddleError::Forbidden(message.id))
    );
    assert_eq!(sink.count_named(&alice, "delete_message").await, 0);

    hub.handle(alice, ClientEvent::DeleteMessage { msg_id: message.id })
        .await;

    for member in [alice, bob] {
        assert_eq!(
            sink.events_for(&member).await.last(),
            Some(&ServerEvent::DeleteMessage { id: message.id })
        );
    }
    assert!(hub.history(&room("global"), None).await.is_empty());
}

#[tokio::test]
async fn test_delete_reaches_stored_room_not_requester_room() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;

    let message = hub
        .send_message(alice, &room("global"), Some("old".to_owned()), None, None)
        .await
        .unwrap();

    // Alice moves on, then deletes her old message.
    hub.join(alice, room("lobby")).await.unwrap();
    hub.handle(alice, ClientEvent::DeleteMessage { msg_id: message.id })
        .await;

    assert_eq!(
        sink.events_for(&bob).await.last(),
        Some(&ServerEvent::DeleteMessage { id: message.id })
    );
    assert_eq!(sink.count_named(&alice, "delete_message").await, 0);
}

#[tokio::test]
async fn test_delete_unknown_message_reports_not_found() {
    init_tracing();

    let (hub, sink) = create_test_hub();
    let alice = connect_and_join(&hub, "alice", "global").await;

    hub.handle(alice, ClientEvent::DeleteMessage { msg_id: 42.into() })
        .await;

    assert!(matches!(
        sink.events_for(&alice).await.last(),
        Some(ServerEvent::Error {
            kind: ErrorKind::NotFound,
            ..
        })
    ));
}
