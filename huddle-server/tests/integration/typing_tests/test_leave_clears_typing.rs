use huddle_core::ServerEvent;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_leave_clears_typing() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let carol = connect_and_join(&hub, "carol", "R").await;
    let dave = connect_and_join(&hub, "dave", "R").await;

    hub.set_typing(carol, &room("R"), true).await.unwrap();
    sink.clear().await;

    hub.join(carol, room("elsewhere")).await.unwrap();

    assert_eq!(
        sink.events_for(&dave).await,
        vec![
            ServerEvent::UserTyping {
                room: room("R"),
                username: "carol".to_owned(),
                typing: false,
            },
            ServerEvent::UserLeft {
                room: room("R"),
                username: "carol".to_owned(),
            },
        ]
    );
}
