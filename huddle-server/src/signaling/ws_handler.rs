use crate::http::AppState;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use huddle_core::{ClientEvent, ConnectionId, HuddleError, ServerEvent};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, username, state))
}

async fn handle_socket(socket: WebSocket, username: String, state: AppState) {
    let id = ConnectionId::new();
    info!("New WebSocket connection {} ('{}')", id, username);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.gateway.add_peer(id, tx);

    if let Err(e) = state.hub.connect(id, &username).await {
        warn!("Refusing connection {}: {}", id, e);
        state.gateway.send_event(id, &ServerEvent::error(&e));
        state.gateway.remove_peer(&id);
        // Flush the error frame before the socket is dropped.
        while let Ok(msg) = rx.try_recv() {
            let _ = sender.send(msg).await;
        }
        let _ = sender.close().await;
        return;
    }

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let hub = state.hub.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => {
                            debug!("<- {} {:?}", id, event);
                            hub.handle(id, event).await;
                        }
                        Err(e) => {
                            hub.report(id, &HuddleError::MalformedEvent(e.to_string()))
                                .await;
                        }
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.hub.disconnect(id).await;
    state.gateway.remove_peer(&id);
    info!("WebSocket disconnected: {}", id);
}
