use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use huddle_core::ServerEvent;
use huddle_server::{DeleteResponse, Requester, delete_message};

use super::create_test_state;
use crate::integration::init_tracing;
use crate::utils::{connect_and_join, room};

#[tokio::test]
async fn test_delete_endpoint() {
    init_tracing();

    let (state, sink) = create_test_state();
    let alice = connect_and_join(&state.hub, "alice", "global").await;
    let bob = connect_and_join(&state.hub, "bob", "global").await;

    let message = state
        .hub
        .send_message(alice, &room("global"), Some("M".to_owned()), None, None)
        .await
        .unwrap();

    let Err(err) = delete_message(
        State(state.clone()),
        Path(message.id.0),
        Requester("bob".to_owned()),
    )
    .await
    else {
        panic!("bob must not delete alice's message");
    };
    assert_eq!(err.status, StatusCode::FORBIDDEN);

    let Ok(Json(response)) = delete_message(
        State(state.clone()),
        Path(message.id.0),
        Requester("alice".to_owned()),
    )
    .await
    else {
        panic!("alice may delete her own message");
    };
    assert_eq!(
        response,
        DeleteResponse {
            success: true,
            error: None,
        }
    );
    assert_eq!(
        sink.events_for(&bob).await.last(),
        Some(&ServerEvent::DeleteMessage { id: message.id })
    );

    let Err(err) = delete_message(
        State(state),
        Path(message.id.0),
        Requester("alice".to_owned()),
    )
    .await
    else {
        panic!("already deleted");
    };
    assert_eq!(err.status, StatusCode::NOT_FOUND);
}
