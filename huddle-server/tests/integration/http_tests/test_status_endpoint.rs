use axum::Json;
use axum::extract::State;
use huddle_server::{Requester, SetStatusRequest, recent_statuses, set_status};

use super::create_test_state;
use crate::integration::init_tracing;
use crate::utils::connect_and_join;

#[tokio::test]
async fn test_set_status_endpoint() {
    init_tracing();

    let (state, sink) = create_test_state();
    let alice = connect_and_join(&state.hub, "alice", "global").await;
    sink.clear().await;

    let Json(status) = set_status(
        State(state.clone()),
        Requester("bob".to_owned()),
        Json(SetStatusRequest {
            status: "reviewing".to_owned(),
        }),
    )
    .await
    .unwrap();
    assert_eq!(status.username, "bob");
    assert_eq!(status.status, "reviewing");

    assert_eq!(sink.names_for(&alice).await, vec!["status_update"]);

    let Json(recent) = recent_statuses(State(state.clone())).await;
    assert_eq!(recent, vec![status]);
}

#[tokio::test]
async fn test_set_status_rejects_overlong_text() {
    init_tracing();

    let (state, _sink) = create_test_state();
    let result = set_status(
        State(state.clone()),
        Requester("bob".to_owned()),
        Json(SetStatusRequest {
            status: "y".repeat(200),
        }),
    )
    .await;

    assert!(result.is_err());
    let Json(recent) = recent_statuses(State(state)).await;
    assert!(recent.is_empty());
}
