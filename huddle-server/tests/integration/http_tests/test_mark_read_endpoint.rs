use axum::Json;
use axum::extract::State;
use huddle_server::{MarkReadRequest, MarkReadResponse, Requester, health, mark_read};

use super::create_test_state;
use crate::integration::init_tracing;
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_mark_read_endpoint() {
    init_tracing();

    let (state, _sink) = create_test_state();
    let alice = connect_and_join(&state.hub, "alice", "global").await;
    let bob = connect_and_join(&state.hub, "bob", "global").await;

    for (from, text) in [(alice, "a1"), (bob, "b1"), (bob, "b2")] {
        state
            .hub
            .send_message(from, &room("global"), Some(text.to_owned()), None, None)
            .await
            .unwrap();
    }

    let Json(response) = mark_read(
        State(state.clone()),
        Requester("alice".to_owned()),
        Json(MarkReadRequest {
            room: room("global"),
        }),
    )
    .await;
    assert_eq!(response, MarkReadResponse { ok: true, count: 2 });

    let history = state.hub.history(&room("global"), None).await;
    let read: Vec<_> = history.iter().map(|m| (m.sender.as_str(), m.read)).collect();
    assert_eq!(read, vec![("alice", false), ("bob", true), ("bob", true)]);
}

#[tokio::test]
async fn test_health() {
    assert_eq!(health().await, "ok");
}

#[tokio::test]
async fn test_mark_read_trusts_requester_header() {
    init_tracing();

    let (state, _sink) = create_test_state();
    let alice = connect_and_join(&state.hub, "alice", "lobby").await;
    state
        .hub
        .send_message(alice, &room("lobby"), Some("hi".to_owned()), None, None)
        .await
        .unwrap();

    // "dave" never connected and is not in the room.
    let Json(response) = mark_read(
        State(state.clone()),
        Requester("dave".to_owned()),
        Json(MarkReadRequest {
            room: room("lobby"),
        }),
    )
    .await;
    assert_eq!(response, MarkReadResponse { ok: true, count: 1 });
    assert!(state.hub.history(&room("lobby"), None).await[0].read);
}
