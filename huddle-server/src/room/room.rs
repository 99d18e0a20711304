use crate::chat::MessageBus;
use crate::room::{Member, RoomCommand, RoomContext};
use crate::signaling::{EventSink, SignalingRelay};
use crate::typing::TypingTracker;
use dashmap::DashMap;
use huddle_core::{ConnectionId, HuddleError, RoomId, ServerEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// One room's actor. Owns the member set, typing flags, call state and chat
/// bus, and applies commands strictly in arrival order.
pub struct Room {
    id: RoomId,
    members: Arc<DashMap<ConnectionId, Member>>,
    command_rx: mpsc::Receiver<RoomCommand>,
    sink: Arc<dyn EventSink>,
    bus: MessageBus,
    typing: TypingTracker,
    relay: SignalingRelay,
    idle_timeout: Duration,
}

impl Room {
    pub fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        sink: Arc<dyn EventSink>,
        bus: MessageBus,
        typing_timeout: Duration,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            relay: SignalingRelay::new(id.clone()),
            id,
            members: Arc::new(DashMap::new()),
            command_rx,
            sink,
            bus,
            typing: TypingTracker::new(typing_timeout),
            idle_timeout,
        }
    }

    /// Runs until the room has been empty for the idle timeout or every sender
    /// is gone. Hands back the receiver so queued commands can be rerouted.
    pub async fn run(mut self) -> mpsc::Receiver<RoomCommand> {
        info!("[{}] Room event loop started", self.id);

        let mut empty_since = Some(Instant::now());

        loop {
            let typing_deadline = self.typing.next_deadline();
            let idle_deadline = empty_since.map(|since| since + self.idle_timeout);

            tokio::select! {
                biased;

                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("[{}] Command channel closed. Shutting down room.", self.id);
                            break;
                        }
                    }

                    empty_since = if self.members.is_empty() {
                        empty_since.or_else(|| Some(Instant::now()))
                    } else {
                        None
                    };
                }

                _ = sleep_until(typing_deadline) => self.expire_typing().await,

                _ = sleep_until(idle_deadline) => {
                    info!("[{}] Room idle for {:?}, shutting down", self.id, self.idle_timeout);
                    break;
                }
            }
        }

        info!("[{}] Room event loop finished", self.id);
        self.command_rx
    }

    fn context(&self) -> RoomContext {
        RoomContext::new(self.members.clone(), self.sink.clone())
    }

    async fn handle_command(&mut self, cmd: RoomCommand) {
        let ctx = self.context();

        match cmd {
            RoomCommand::Join { member, reply } => {
                if !ctx.contains(&member.id) {
                    info!("[{}] '{}' joined ({})", self.id, member.username, member.id);
                    let (id, username) = (member.id, member.username.clone());
                    self.members.insert(id, member);
                    ctx.broadcast_except(
                        id,
                        ServerEvent::UserJoined {
                            room: self.id.clone(),
                            username,
                        },
                    )
                    .await;
                }
                let _ = reply.send(Ok(()));
            }

            RoomCommand::Leave { id, reply } => {
                self.remove_member(&ctx, id).await;
                let _ = reply.send(Ok(()));
            }

            RoomCommand::Send {
                from,
                text,
                attachment,
                client_id,
                reply,
            } => {
                let result = match self.member_name(&ctx, &from) {
                    Ok(sender) => {
                        self.bus
                            .post(&sender, text.as_deref(), attachment.as_deref())
                            .await
                    }
                    Err(e) => Err(e),
                };
                if let Ok(message) = &result {
                    ctx.broadcast(ServerEvent::new_message(message.clone(), client_id))
                        .await;
                }
                let _ = reply.send(result);
            }

            RoomCommand::Delete {
                requester,
                msg_id,
                reply,
            } => {
                let result = self.bus.delete(&requester, msg_id).await;
                if result.is_ok() {
                    info!("[{}] Message {} deleted by '{}'", self.id, msg_id, requester);
                    ctx.broadcast(ServerEvent::DeleteMessage { id: msg_id }).await;
                }
                let _ = reply.send(result);
            }

            RoomCommand::ToggleReaction {
                from,
                msg_id,
                emoji,
                reply,
            } => {
                let result = match self.member_name(&ctx, &from) {
                    Ok(user) => self.bus.toggle_reaction(&user, msg_id, &emoji).await,
                    Err(e) => Err(e),
                };
                if let Ok(message) = &result {
                    ctx.broadcast(ServerEvent::ReactionUpdate {
                        id: message.id,
                        room: message.room.clone(),
                        reactions: message.reactions.clone(),
                    })
                    .await;
                }
                let _ = reply.send(result);
            }

            RoomCommand::Typing {
                from,
                typing,
                reply,
            } => {
                let result = self.member_name(&ctx, &from);
                if let Ok(username) = &result {
                    self.typing.set(from, username, typing, Instant::now());
                    ctx.broadcast_except(
                        from,
                        ServerEvent::UserTyping {
                            room: self.id.clone(),
                            username: username.clone(),
                            typing,
                        },
                    )
                    .await;
                }
                let _ = reply.send(result.map(|_| ()));
            }

            RoomCommand::Signal {
                from,
                signal,
                reply,
            } => {
                let result = if ctx.contains(&from) {
                    self.relay.handle(from, signal, |id| ctx.contains(id))
                } else {
                    Err(HuddleError::NotInRoom(self.id.clone()))
                };

                match result {
                    Ok(outbound) => {
                        for out in outbound {
                            ctx.deliver(out).await;
                        }
                        let _ = reply.send(Ok(()));
                    }
                    Err(e) => {
                        warn!("[{}] Rejected signal from {}: {}", self.id, from, e);
                        let _ = reply.send(Err(e));
                    }
                }
            }

            RoomCommand::Members { reply } => {
                let _ = reply.send(Ok(ctx.list_members()));
            }
        }
    }

    fn member_name(&self, ctx: &RoomContext, id: &ConnectionId) -> Result<String, HuddleError> {
        ctx.username_of(id)
            .ok_or_else(|| HuddleError::NotInRoom(self.id.clone()))
    }

    /// Drops `id` and unwinds everything it held: typing flag, call, membership.
    async fn remove_member(&mut self, ctx: &RoomContext, id: ConnectionId) {
        let Some((_, member)) = self.members.remove(&id) else {
            return;
        };

        if self.typing.clear(&id).is_some() {
            ctx.broadcast(ServerEvent::UserTyping {
                room: self.id.clone(),
                username: member.username.clone(),
                typing: false,
            })
            .await;
        }

        for out in self.relay.member_left(id) {
            ctx.deliver(out).await;
        }

        ctx.broadcast(ServerEvent::UserLeft {
            room: self.id.clone(),
            username: member.username.clone(),
        })
        .await;

        info!("[{}] '{}' left ({})", self.id, member.username, id);
    }

    async fn expire_typing(&mut self) {
        let ctx = self.context();

        for (id, username) in self.typing.expire(Instant::now()) {
            debug!("[{}] Typing flag of '{}' expired", self.id, username);
            ctx.broadcast_except(
                id,
                ServerEvent::UserTyping {
                    room: self.id.clone(),
                    username,
                    typing: false,
                },
            )
            .await;
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
