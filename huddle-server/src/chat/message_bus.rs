use crate::chat::HistoryStore;
use chrono::{DateTime, TimeDelta, Utc};
use huddle_core::{HuddleError, Message, MessageId, Reactions, RoomId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

const MAX_EMOJI_CHARS: usize = 16;

pub fn validate_emoji(emoji: &str) -> Result<(), HuddleError> {
    if emoji.is_empty() || emoji.chars().count() > MAX_EMOJI_CHARS {
        return Err(HuddleError::InvalidEmoji);
    }
    Ok(())
}

/// Process-wide message id source shared by every room.
#[derive(Debug, Clone, Default)]
pub struct MessageIds(Arc<AtomicU64>);

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> MessageId {
        MessageId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// Chat mutations of one room. Owned by the room actor, so posts within a
/// room are serialized and their timestamps strictly increase.
pub struct MessageBus {
    room: RoomId,
    history: Arc<dyn HistoryStore>,
    ids: MessageIds,
    last_timestamp: Option<DateTime<Utc>>,
}

impl MessageBus {
    pub fn new(room: RoomId, history: Arc<dyn HistoryStore>, ids: MessageIds) -> Self {
        Self {
            room,
            history,
            ids,
            last_timestamp: None,
        }
    }

    pub async fn post(
        &mut self,
        sender: &str,
        text: Option<&str>,
        attachment: Option<&str>,
    ) -> Result<Message, HuddleError> {
        let Some((text, attachment)) = Message::normalize_body(text, attachment) else {
            warn!("[{}] Rejected empty message from '{}'", self.room, sender);
            return Err(HuddleError::EmptyMessage);
        };

        let message = Message {
            id: self.ids.next(),
            room: self.room.clone(),
            sender: sender.to_owned(),
            text,
            attachment,
            timestamp: self.next_timestamp(),
            reactions: Reactions::default(),
            read: false,
        };

        self.history.put(message.clone()).await;
        debug!("[{}] Stored message {} from '{}'", self.room, message.id, sender);
        Ok(message)
    }

    /// Hard-deletes `id` when `requester` is its sender.
    pub async fn delete(&self, requester: &str, id: MessageId) -> Result<Message, HuddleError> {
        let message = self
            .history
            .get(id)
            .await
            .ok_or(HuddleError::MessageNotFound(id))?;

        if message.sender != requester {
            warn!(
                "'{}' tried to delete message {} owned by '{}'",
                requester, id, message.sender
            );
            return Err(HuddleError::Forbidden(id));
        }

        self.history
            .delete(id)
            .await
            .ok_or(HuddleError::MessageNotFound(id))
    }

    pub async fn toggle_reaction(
        &self,
        user: &str,
        id: MessageId,
        emoji: &str,
    ) -> Result<Message, HuddleError> {
        validate_emoji(emoji)?;

        let (emoji, user) = (emoji.to_owned(), user.to_owned());
        self.history
            .update_reactions(
                id,
                Box::new(move |reactions| {
                    reactions.toggle(&emoji, &user);
                }),
            )
            .await
            .ok_or(HuddleError::MessageNotFound(id))
    }

    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let timestamp = match self.last_timestamp {
            Some(last) if now <= last => last + TimeDelta::microseconds(1),
            _ => now,
        };
        self.last_timestamp = Some(timestamp);
        timestamp
    }
}
