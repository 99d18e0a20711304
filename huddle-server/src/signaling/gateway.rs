use crate::signaling::EventSink;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

struct GatewayInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
}

/// WebSocket writer registry: one unbounded queue per open socket, drained by
/// that socket's send task.
#[derive(Clone)]
pub struct Gateway {
    inner: Arc<GatewayInner>,
}

impl Gateway {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                peers: DashMap::new(),
            }),
        }
    }

    pub fn add_peer(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(id, tx);
    }

    pub fn remove_peer(&self, id: &ConnectionId) {
        self.inner.peers.remove(id);
    }

    pub fn peer_count(&self) -> usize {
        self.inner.peers.len()
    }

    pub fn send_event(&self, id: ConnectionId, event: &ServerEvent) {
        let Some(peer) = self.inner.peers.get(&id) else {
            warn!(
                "Attempted to send '{}' to disconnected connection {}",
                event.name(),
                id
            );
            return;
        };

        match serde_json::to_string(event) {
            Ok(json) => {
                debug!("-> {} {}", id, event.name());
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to queue WS message to {}: {:?}", id, e);
                }
            }
            Err(e) => error!("Failed to serialize '{}': {}", event.name(), e),
        }
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSink for Gateway {
    async fn deliver(&self, to: ConnectionId, event: ServerEvent) {
        self.send_event(to, &event);
    }
}
