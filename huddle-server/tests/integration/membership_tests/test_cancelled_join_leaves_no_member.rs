use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerEvent};
use huddle_server::{EventSink, Hub, HubConfig};
use std::sync::{Arc, Mutex};
use tokio::task::AbortHandle;

use crate::integration::init_tracing;
use crate::utils::{connect, connect_and_join, room};

/// Aborts the pending join as soon as the room announces it, so the joiner
/// never sees the room's reply.
#[derive(Default)]
struct AbortOnJoinSink {
    join_task: Mutex<Option<AbortHandle>>,
}

#[async_trait]
impl EventSink for AbortOnJoinSink {
    async fn deliver(&self, _to: ConnectionId, event: ServerEvent) {
        if matches!(event, ServerEvent::UserJoined { .. }) {
            if let Some(handle) = self.join_task.lock().unwrap().take() {
                handle.abort();
            }
        }
    }
}

#[tokio::test]
async fn test_cancelled_join_leaves_no_member() {
    init_tracing();

    let sink = Arc::new(AbortOnJoinSink::default());
    let hub = Hub::with_memory_history(HubConfig::default(), sink.clone());

    let watcher = connect_and_join(&hub, "watcher", "R").await;
    let ghost = connect(&hub, "ghost").await;

    let join = tokio::spawn({
        let hub = hub.clone();
        async move { hub.join(ghost, room("R")).await }
    });
    *sink.join_task.lock().unwrap() = Some(join.abort_handle());

    assert!(join.await.unwrap_err().is_cancelled());
    assert_eq!(hub.registry().room_of(&ghost), Some(room("R")));

    hub.disconnect(ghost).await;

    let members: Vec<String> = hub
        .members_of(&room("R"))
        .await
        .into_iter()
        .map(|m| m.username)
        .collect();
    assert_eq!(members, vec!["watcher".to_owned()]);
    assert_eq!(hub.registry().room_of(&watcher), Some(room("R")));
    assert_eq!(hub.registry().len(), 1);
}
