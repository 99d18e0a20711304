use super::{CallState, ClientSession, PendingMessage, TYPING_RESEND_INTERVAL};
use crate::SessionError;
use huddle_core::{ClientEvent, Message, MessageId, RoomId};
use std::time::Instant;
use tracing::debug;

impl ClientSession {
    /// Moves to `room`. The view, typing indicators and any call belong to the
    /// old room and are dropped; the server ends the call for the other side.
    pub fn join(&mut self, room: RoomId) -> ClientEvent {
        if self.room.as_ref() != Some(&room) {
            self.reset_room_state();
            self.call = CallState::Idle;
            self.room = Some(room.clone());
        }
        ClientEvent::Join { room }
    }

    pub fn leave(&mut self) -> Result<ClientEvent, SessionError> {
        self.current_room()?;
        self.reset_room_state();
        self.call = CallState::Idle;
        self.room = None;
        Ok(ClientEvent::Leave {})
    }

    pub fn send_text(&mut self, text: &str) -> Result<ClientEvent, SessionError> {
        self.post(Some(text), None)
    }

    /// Posts an already uploaded file by its `/uploads/...` url.
    pub fn send_attachment(&mut self, url: &str) -> Result<ClientEvent, SessionError> {
        self.post(None, Some(url))
    }

    pub(super) fn post(
        &mut self,
        text: Option<&str>,
        attachment: Option<&str>,
    ) -> Result<ClientEvent, SessionError> {
        let room = self.current_room()?;
        let (text, attachment) =
            Message::normalize_body(text, attachment).ok_or(SessionError::EmptyMessage)?;

        self.next_client_id += 1;
        let client_id = format!(
            "{}-{}",
            self.username.as_deref().unwrap_or("anon"),
            self.next_client_id
        );
        self.view.add_pending(PendingMessage {
            client_id: client_id.clone(),
            text: text.clone(),
            attachment: attachment.clone(),
        });
        // Posting ends the typing burst on the server side too.
        self.typing_sent = None;

        debug!("Posting placeholder {}", client_id);
        Ok(ClientEvent::SendMessage {
            room,
            text,
            attachment,
            client_id: Some(client_id),
        })
    }

    pub fn delete(&self, msg_id: MessageId) -> Result<ClientEvent, SessionError> {
        let message = self
            .view
            .get(msg_id)
            .ok_or(SessionError::UnknownMessage(msg_id))?;
        if self.username.as_deref() != Some(message.sender.as_str()) {
            return Err(SessionError::NotOwner(msg_id));
        }
        Ok(ClientEvent::DeleteMessage { msg_id })
    }

    /// The view is updated when the server's `reaction_update` arrives.
    pub fn toggle_reaction(
        &self,
        msg_id: MessageId,
        emoji: &str,
    ) -> Result<ClientEvent, SessionError> {
        if self.view.get(msg_id).is_none() {
            return Err(SessionError::UnknownMessage(msg_id));
        }
        Ok(ClientEvent::ToggleReaction {
            msg_id,
            emoji: emoji.to_owned(),
        })
    }

    /// Call on every keystroke (`typing = true`) and when the input is cleared or
    /// blurred (`typing = false`). Returns an event only when one should be sent.
    pub fn set_typing(&mut self, typing: bool, now: Instant) -> Option<ClientEvent> {
        let room = self.room.clone()?;

        let send = match (typing, self.typing_sent) {
            (true, None) => true,
            (true, Some(at)) => now.saturating_duration_since(at) >= TYPING_RESEND_INTERVAL,
            (false, sent) => sent.is_some(),
        };
        if !send {
            return None;
        }

        self.typing_sent = typing.then_some(now);
        Some(ClientEvent::Typing { room, typing })
    }
}
