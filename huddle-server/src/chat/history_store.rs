use async_trait::async_trait;
use dashmap::DashMap;
use huddle_core::{Message, MessageId, Reactions, RoomId};
use std::collections::BTreeSet;

pub type ReactionEdit = Box<dyn FnOnce(&mut Reactions) + Send>;

/// Message storage used by the hub. Implementations must apply each call to a
/// single message atomically.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn put(&self, message: Message);

    async fn get(&self, id: MessageId) -> Option<Message>;

    /// Up to `limit` messages of `room`, oldest first.
    async fn get_by_room(&self, room: &RoomId, limit: usize) -> Vec<Message>;

    async fn delete(&self, id: MessageId) -> Option<Message>;

    /// Applies `edit` to the message's reactions and returns the updated message.
    async fn update_reactions(&self, id: MessageId, edit: ReactionEdit) -> Option<Message>;

    /// Flags every message in `room` not sent by `reader` as read.
    /// Returns how many messages changed.
    async fn mark_read(&self, room: &RoomId, reader: &str) -> usize;
}

/// In-process history. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryHistory {
    messages: DashMap<MessageId, Message>,
    by_room: DashMap<RoomId, BTreeSet<MessageId>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    fn room_ids(&self, room: &RoomId) -> Vec<MessageId> {
        self.by_room
            .get(room)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistory {
    async fn put(&self, message: Message) {
        self.by_room
            .entry(message.room.clone())
            .or_default()
            .insert(message.id);
        self.messages.insert(message.id, message);
    }

    async fn get(&self, id: MessageId) -> Option<Message> {
        self.messages.get(&id).map(|entry| entry.value().clone())
    }

    async fn get_by_room(&self, room: &RoomId, limit: usize) -> Vec<Message> {
        let ids = self.room_ids(room);
        let skip = ids.len().saturating_sub(limit);

        ids.into_iter()
            .skip(skip)
            .filter_map(|id| self.messages.get(&id).map(|entry| entry.value().clone()))
            .collect()
    }

    async fn delete(&self, id: MessageId) -> Option<Message> {
        let (_, message) = self.messages.remove(&id)?;
        if let Some(mut ids) = self.by_room.get_mut(&message.room) {
            ids.remove(&id);
        }
        Some(message)
    }

    async fn update_reactions(&self, id: MessageId, edit: ReactionEdit) -> Option<Message> {
        let mut entry = self.messages.get_mut(&id)?;
        edit(&mut entry.reactions);
        Some(entry.value().clone())
    }

    async fn mark_read(&self, room: &RoomId, reader: &str) -> usize {
        let mut count = 0;
        for id in self.room_ids(room) {
            let Some(mut message) = self.messages.get_mut(&id) else {
                continue;
            };
            if message.sender != reader && !message.read {
                message.read = true;
                count += 1;
            }
        }
        count
    }
}
