use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerEvent};

/// Outbound side of the transport. Room actors push events through it and never
/// wait for the peer: implementations must only enqueue.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, to: ConnectionId, event: ServerEvent);
}
