use huddle_core::ServerEvent;

use crate::integration::{create_test_hub, init_tracing};
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_members_observe_acceptance_order() {
    init_tracing();

    let (hub, sink) = create_test_hub();

    let alice = connect_and_join(&hub, "alice", "global").await;
    let bob = connect_and_join(&hub, "bob", "global").await;

    let mut tasks = Vec::new();
    for (sender, prefix) in [(alice, "a"), (bob, "b")] {
        let hub = hub.clone();
        tasks.push(tokio::spawn(async move {
            for n in 0..20 {
                hub.send_message(sender, &room("global"), Some(format!("{prefix}{n}")), None, None)
                    .await
                    .unwrap();
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    let seen = |events: Vec<ServerEvent>| -> Vec<u64> {
        events
            .into_iter()
            .filter_map(|e| match e {
                ServerEvent::NewMessage(posted) => Some(posted.message.id.0),
                _ => None,
            })
            .collect()
    };

    let for_alice = seen(sink.events_for(&alice).await);
    let for_bob = seen(sink.events_for(&bob).await);

    assert_eq!(for_alice.len(), 40);
    assert_eq!(for_alice, for_bob);

    let history: Vec<u64> = hub
        .history(&room("global"), None)
        .await
        .into_iter()
        .map(|m| m.id.0)
        .collect();
    assert_eq!(history, for_alice);
}
