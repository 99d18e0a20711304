use crate::signaling::{EventSink, Outbound, Recipients};
use dashmap::DashMap;
use huddle_core::{ConnectionId, ServerEvent};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: ConnectionId,
    pub username: String,
}

/// Room-scoped delivery helpers handed around inside the room actor.
#[derive(Clone)]
pub struct RoomContext {
    members: Arc<DashMap<ConnectionId, Member>>,
    sink: Arc<dyn EventSink>,
}

impl RoomContext {
    pub(crate) fn new(members: Arc<DashMap<ConnectionId, Member>>, sink: Arc<dyn EventSink>) -> Self {
        Self { members, sink }
    }

    pub async fn send(&self, to: ConnectionId, event: ServerEvent) {
        self.sink.deliver(to, event).await;
    }

    /// Sends `event` to every current member, in a stable order.
    pub async fn broadcast(&self, event: ServerEvent) {
        for id in self.member_ids() {
            self.sink.deliver(id, event.clone()).await;
        }
    }

    pub async fn broadcast_except(&self, except: ConnectionId, event: ServerEvent) {
        for id in self.member_ids().into_iter().filter(|id| *id != except) {
            self.sink.deliver(id, event.clone()).await;
        }
    }

    pub async fn deliver(&self, outbound: Outbound) {
        match outbound.to {
            Recipients::One(id) => self.send(id, outbound.event).await,
            Recipients::AllExcept(id) => self.broadcast_except(id, outbound.event).await,
        }
    }

    pub fn list_members(&self) -> Vec<Member> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        members.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
        members
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains_key(id)
    }

    pub fn username_of(&self, id: &ConnectionId) -> Option<String> {
        self.members.get(id).map(|entry| entry.username.clone())
    }

    // Ids are collected first so no map guard is held across an await.
    fn member_ids(&self) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self.members.iter().map(|entry| *entry.key()).collect();
        ids.sort();
        ids
    }
}
