use huddle_core::{Message, MessageId, PostedMessage, Reactions};
use std::collections::BTreeMap;

/// A message we sent that the server has not echoed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub client_id: String,
    pub text: Option<String>,
    pub attachment: Option<String>,
}

/// Messages of the joined room keyed by server id, plus unconfirmed local placeholders.
#[derive(Debug, Default)]
pub struct MessageView {
    messages: BTreeMap<MessageId, Message>,
    pending: Vec<PendingMessage>,
}

impl MessageView {
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Confirmed messages in id order, which is also posting order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn pending(&self) -> &[PendingMessage] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.pending.is_empty()
    }

    pub(super) fn add_pending(&mut self, pending: PendingMessage) {
        self.pending.push(pending);
    }

    /// Stores a server-confirmed message, retiring the placeholder it answers.
    /// Returns `false` when the id was already in view.
    pub(super) fn confirm(&mut self, posted: PostedMessage) -> bool {
        if let Some(client_id) = posted.client_id.as_deref() {
            self.pending.retain(|p| p.client_id != client_id);
        }
        let id = posted.message.id;
        self.messages.insert(id, posted.message).is_none()
    }

    /// Replaces confirmed messages with a history page. Placeholders survive.
    pub(super) fn load(&mut self, history: Vec<Message>) {
        self.messages = history.into_iter().map(|m| (m.id, m)).collect();
    }

    pub(super) fn remove(&mut self, id: MessageId) -> Option<Message> {
        self.messages.remove(&id)
    }

    pub(super) fn set_reactions(&mut self, id: MessageId, reactions: Reactions) -> bool {
        match self.messages.get_mut(&id) {
            Some(message) => {
                message.reactions = reactions;
                true
            }
            None => false,
        }
    }

    pub(super) fn clear(&mut self) {
        self.messages.clear();
        self.pending.clear();
    }
}
