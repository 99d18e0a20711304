use crate::room::Member;
use crate::signaling::Signal;
use huddle_core::{ConnectionId, HuddleError, Message, MessageId};
use tokio::sync::oneshot;

pub type Reply<T> = oneshot::Sender<Result<T, HuddleError>>;

/// Work queued to a room actor. Every command carries a reply slot so the
/// caller can await the actor's acknowledgment.
#[derive(Debug)]
pub enum RoomCommand {
    Join {
        member: Member,
        reply: Reply<()>,
    },

    /// No-op for connections that are not members.
    Leave {
        id: ConnectionId,
        reply: Reply<()>,
    },

    Send {
        from: ConnectionId,
        text: Option<String>,
        attachment: Option<String>,
        client_id: Option<String>,
        reply: Reply<Message>,
    },

    /// Deletions are authorized by name so they can arrive over HTTP too.
    Delete {
        requester: String,
        msg_id: MessageId,
        reply: Reply<Message>,
    },

    ToggleReaction {
        from: ConnectionId,
        msg_id: MessageId,
        emoji: String,
        reply: Reply<Message>,
    },

    Typing {
        from: ConnectionId,
        typing: bool,
        reply: Reply<()>,
    },

    Signal {
        from: ConnectionId,
        signal: Signal,
        reply: Reply<()>,
    },

    Members {
        reply: Reply<Vec<Member>>,
    },
}
