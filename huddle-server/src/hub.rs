use crate::chat::{HistoryStore, MemoryHistory};
use crate::config::HubConfig;
use crate::registry::{Connection, ConnectionRegistry};
use crate::room::{Member, RoomCommand, RoomManager};
use crate::signaling::{EventSink, Signal};
use crate::status::StatusBoard;
use chrono::Utc;
use huddle_core::{
    ClientEvent, ConnectionId, HuddleError, Message, MessageId, RoomId, ServerEvent, UserStatus,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MAX_USERNAME_CHARS: usize = 32;

struct HubInner {
    config: Arc<HubConfig>,
    registry: ConnectionRegistry,
    rooms: RoomManager,
    history: Arc<dyn HistoryStore>,
    statuses: StatusBoard,
    sink: Arc<dyn EventSink>,
}

/// Entry point for every client action, whatever transport it came from.
#[derive(Clone)]
pub struct Hub {
    inner: Arc<HubInner>,
}

impl Hub {
    pub fn new(config: HubConfig, sink: Arc<dyn EventSink>, history: Arc<dyn HistoryStore>) -> Self {
        let config = Arc::new(config);
        let rooms = RoomManager::new(config.clone(), sink.clone(), history.clone());

        Self {
            inner: Arc::new(HubInner {
                config,
                registry: ConnectionRegistry::new(),
                rooms,
                history,
                statuses: StatusBoard::new(),
                sink,
            }),
        }
    }

    pub fn with_memory_history(config: HubConfig, sink: Arc<dyn EventSink>) -> Self {
        Self::new(config, sink, Arc::new(MemoryHistory::new()))
    }

    pub fn config(&self) -> &HubConfig {
        &self.inner.config
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.inner.registry
    }

    pub fn rooms(&self) -> &RoomManager {
        &self.inner.rooms
    }

    pub fn statuses(&self) -> &StatusBoard {
        &self.inner.statuses
    }

    /// Registers the connection and greets it with `connected`.
    pub async fn connect(&self, id: ConnectionId, username: &str) -> Result<Connection, HuddleError> {
        let username = username.trim();
        if username.is_empty()
            || username.chars().count() > MAX_USERNAME_CHARS
            || username.chars().any(char::is_control)
        {
            return Err(HuddleError::InvalidUsername(username.to_owned()));
        }

        let connection = self.inner.registry.register(id, username)?;
        info!("Connection {} opened as '{}'", id, username);

        self.inner
            .sink
            .deliver(
                id,
                ServerEvent::Connected {
                    username: connection.username.clone(),
                    connection_id: id,
                    ice_servers: self.inner.config.ice_servers.clone(),
                },
            )
            .await;

        Ok(connection)
    }

    /// Leaves the current room (awaited) and forgets the connection. Idempotent.
    pub async fn disconnect(&self, id: ConnectionId) {
        if let Err(e) = self.leave(id).await {
            debug!("Leave on disconnect of {}: {}", id, e);
        }
        if self.inner.registry.unregister(&id).is_some() {
            info!("Connection {} closed", id);
        }
    }

    pub async fn join(&self, id: ConnectionId, room: RoomId) -> Result<(), HuddleError> {
        let connection = self.inner.registry.lookup(&id)?;
        if connection.room.as_ref() == Some(&room) {
            return Ok(());
        }

        if connection.room.is_some() {
            self.leave(id).await?;
        }

        // Recorded before the join is queued: if this future is dropped mid-join,
        // disconnect still finds the room and its Leave queues behind the Join.
        self.inner.registry.set_room(&id, Some(room.clone()))?;

        let member = Member {
            id,
            username: connection.username,
        };
        let joined = self
            .inner
            .rooms
            .request(&room, |reply| RoomCommand::Join { member, reply })
            .await;
        if joined.is_err() {
            let _ = self.inner.registry.set_room(&id, None);
        }
        joined
    }

    pub async fn leave(&self, id: ConnectionId) -> Result<(), HuddleError> {
        let Some(room) = self.inner.registry.room_of(&id) else {
            return Ok(());
        };

        self.inner
            .rooms
            .request(&room, |reply| RoomCommand::Leave { id, reply })
            .await?;
        self.inner.registry.set_room(&id, None)?;
        Ok(())
    }

    /// Applies one client event; failures go back to the sender as `error`.
    pub async fn handle(&self, id: ConnectionId, event: ClientEvent) {
        if let Err(e) = self.dispatch(id, event).await {
            self.report(id, &e).await;
        }
    }

    pub async fn dispatch(&self, id: ConnectionId, event: ClientEvent) -> Result<(), HuddleError> {
        match event {
            ClientEvent::Join { room } => self.join(id, room).await,
            ClientEvent::Leave {} => self.leave(id).await,
            ClientEvent::SendMessage {
                room,
                text,
                attachment,
                client_id,
            } => self
                .send_message(id, &room, text, attachment, client_id)
                .await
                .map(|_| ()),
            ClientEvent::DeleteMessage { msg_id } => {
                let connection = self.inner.registry.lookup(&id)?;
                self.delete_message(&connection.username, msg_id)
                    .await
                    .map(|_| ())
            }
            ClientEvent::ToggleReaction { msg_id, emoji } => {
                self.toggle_reaction(id, msg_id, emoji).await.map(|_| ())
            }
            ClientEvent::Typing { room, typing } => self.set_typing(id, &room, typing).await,
            ClientEvent::Offer {
                room,
                target,
                offer,
            } => {
                self.signal(
                    id,
                    &room,
                    Signal::Offer {
                        target,
                        payload: offer,
                    },
                )
                .await
            }
            ClientEvent::Answer { room, answer, .. } => {
                self.signal(id, &room, Signal::Answer { payload: answer })
                    .await
            }
            ClientEvent::IceCandidate {
                room,
                target,
                candidate,
            } => {
                self.signal(
                    id,
                    &room,
                    Signal::Ice {
                        target,
                        payload: candidate,
                    },
                )
                .await
            }
            ClientEvent::EndCall { room } => self.signal(id, &room, Signal::EndCall).await,
            ClientEvent::SetStatus { status } => {
                let connection = self.inner.registry.lookup(&id)?;
                self.set_status(&connection.username, &status).await.map(|_| ())
            }
        }
    }

    pub async fn report(&self, id: ConnectionId, err: &HuddleError) {
        warn!("Rejected event from {}: {}", id, err);
        self.inner.sink.deliver(id, ServerEvent::error(err)).await;
    }

    pub async fn send_message(
        &self,
        id: ConnectionId,
        room: &RoomId,
        text: Option<String>,
        attachment: Option<String>,
        client_id: Option<String>,
    ) -> Result<Message, HuddleError> {
        self.ensure_member(id, room)?;
        self.inner
            .rooms
            .request(room, |reply| RoomCommand::Send {
                from: id,
                text,
                attachment,
                client_id,
                reply,
            })
            .await
    }

    /// Deletes a message on behalf of `requester`; the removal is announced in
    /// the room the message was posted to.
    pub async fn delete_message(&self, requester: &str, msg_id: MessageId) -> Result<Message, HuddleError> {
        let message = self
            .inner
            .history
            .get(msg_id)
            .await
            .ok_or(HuddleError::MessageNotFound(msg_id))?;

        let requester = requester.to_owned();
        self.inner
            .rooms
            .request(&message.room, |reply| RoomCommand::Delete {
                requester,
                msg_id,
                reply,
            })
            .await
    }

    pub async fn toggle_reaction(
        &self,
        id: ConnectionId,
        msg_id: MessageId,
        emoji: String,
    ) -> Result<Message, HuddleError> {
        let message = self
            .inner
            .history
            .get(msg_id)
            .await
            .ok_or(HuddleError::MessageNotFound(msg_id))?;

        self.ensure_member(id, &message.room)?;
        self.inner
            .rooms
            .request(&message.room, |reply| RoomCommand::ToggleReaction {
                from: id,
                msg_id,
                emoji,
                reply,
            })
            .await
    }

    pub async fn set_typing(&self, id: ConnectionId, room: &RoomId, typing: bool) -> Result<(), HuddleError> {
        self.ensure_member(id, room)?;
        self.inner
            .rooms
            .request(room, |reply| RoomCommand::Typing {
                from: id,
                typing,
                reply,
            })
            .await
    }

    pub async fn signal(&self, id: ConnectionId, room: &RoomId, signal: Signal) -> Result<(), HuddleError> {
        self.ensure_member(id, room)?;
        self.inner
            .rooms
            .request(room, |reply| RoomCommand::Signal {
                from: id,
                signal,
                reply,
            })
            .await
    }

    /// Records `username`'s status and announces it to every connection,
    /// whichever room it is in.
    pub async fn set_status(&self, username: &str, status: &str) -> Result<UserStatus, HuddleError> {
        let status = self.inner.statuses.set(username, status, Utc::now())?;
        debug!("'{}' set status '{}'", username, status.status);

        let event = ServerEvent::StatusUpdate(status.clone());
        for to in self.inner.registry.ids() {
            self.inner.sink.deliver(to, event.clone()).await;
        }
        Ok(status)
    }

    /// Most recent messages of `room`, oldest first.
    pub async fn history(&self, room: &RoomId, limit: Option<usize>) -> Vec<Message> {
        let config = &self.inner.config;
        let limit = limit
            .unwrap_or(config.default_history_limit)
            .min(config.max_history_limit);
        self.inner.history.get_by_room(room, limit).await
    }

    pub async fn mark_read(&self, room: &RoomId, reader: &str) -> usize {
        let count = self.inner.history.mark_read(room, reader).await;
        debug!("[{}] '{}' marked {} messages read", room, reader, count);
        count
    }

    /// Current members of `room`; empty when the room has no actor.
    pub async fn members_of(&self, room: &RoomId) -> Vec<Member> {
        match self
            .inner
            .rooms
            .request_existing(room, |reply| RoomCommand::Members { reply })
            .await
        {
            Some(Ok(members)) => members,
            _ => Vec::new(),
        }
    }

    fn ensure_member(&self, id: ConnectionId, room: &RoomId) -> Result<(), HuddleError> {
        match self.inner.registry.lookup(&id)?.room {
            Some(current) if &current == room => Ok(()),
            Some(_) => Err(HuddleError::NotInRoom(room.clone())),
            None => Err(HuddleError::NoRoom),
        }
    }
}
