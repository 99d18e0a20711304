use super::{ClientSession, Notice};
use huddle_core::{ClientEvent, Message, RoomId, ServerEvent};
use tracing::{debug, info, warn};

impl ClientSession {
    /// Applies a server event. Returns events to transmit in response, which is
    /// only ever the automatic join after the greeting.
    pub fn handle(&mut self, event: ServerEvent) -> Vec<ClientEvent> {
        debug!("session <- {}", event.name());

        match event {
            ServerEvent::Connected {
                username,
                connection_id,
                ice_servers,
            } => {
                info!("Connected as {} ({})", username, connection_id);
                self.username = Some(username);
                self.connection_id = Some(connection_id);
                self.ice_servers = ice_servers;

                let room = self.home_room.clone();
                vec![self.join(room)]
            }

            ServerEvent::NewMessage(posted) => {
                if self.in_room(&posted.message.room) && !self.view.confirm(posted) {
                    debug!("Duplicate message echo ignored");
                }
                Vec::new()
            }

            ServerEvent::DeleteMessage { id } => {
                self.view.remove(id);
                Vec::new()
            }

            ServerEvent::ReactionUpdate {
                id,
                room,
                reactions,
            } => {
                if self.in_room(&room) {
                    self.view.set_reactions(id, reactions);
                }
                Vec::new()
            }

            ServerEvent::UserTyping {
                room,
                username,
                typing,
            } => {
                if self.in_room(&room) && self.username.as_deref() != Some(username.as_str()) {
                    if typing {
                        self.typing.insert(username);
                    } else {
                        self.typing.remove(&username);
                    }
                }
                Vec::new()
            }

            ServerEvent::UserJoined { room, username } => {
                debug!("{} joined {}", username, room);
                Vec::new()
            }

            ServerEvent::UserLeft { room, username } => {
                if self.in_room(&room) {
                    self.typing.remove(&username);
                }
                Vec::new()
            }

            ServerEvent::Offer { room, from, offer } => {
                if self.in_room(&room) {
                    self.on_remote_offer(from, offer);
                }
                Vec::new()
            }

            ServerEvent::Answer { room, from, answer } => {
                if self.in_room(&room) {
                    self.on_remote_answer(from, answer);
                }
                Vec::new()
            }

            ServerEvent::IceCandidate {
                room,
                from,
                candidate,
            } => {
                if self.in_room(&room) {
                    self.on_remote_ice(from, candidate);
                }
                Vec::new()
            }

            ServerEvent::CallGlare { room, winner } => {
                if self.in_room(&room) {
                    self.on_glare(winner);
                }
                Vec::new()
            }

            ServerEvent::CallBusy { room } => {
                if self.in_room(&room) {
                    self.on_busy();
                }
                Vec::new()
            }

            ServerEvent::EndCall { room, reason } => {
                if self.in_room(&room) {
                    self.on_remote_end(reason);
                }
                Vec::new()
            }

            ServerEvent::StatusUpdate(status) => {
                self.on_status(status);
                Vec::new()
            }

            ServerEvent::Error { kind, message } => {
                warn!("Server rejected an event: {}", message);
                self.notices.push_back(Notice::Server { kind, message });
                Vec::new()
            }
        }
    }

    /// Seeds the view from a `/history` page. Messages of other rooms are skipped.
    pub fn load_history(&mut self, history: Vec<Message>) {
        let Some(room) = self.room.as_ref() else {
            warn!("History loaded before joining a room");
            return;
        };
        let page = history.into_iter().filter(|m| &m.room == room).collect();
        self.view.load(page);
    }

    fn in_room(&self, room: &RoomId) -> bool {
        self.room.as_ref() == Some(room)
    }
}
