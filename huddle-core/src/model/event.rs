use crate::error::{ErrorKind, HuddleError};
use crate::model::connection::ConnectionId;
use crate::model::message::{Message, MessageId, Reactions};
use crate::model::room::RoomId;
use crate::model::signaling::IceServerConfig;
use crate::model::status::UserStatus;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Frames a browser sends over the socket: `{"event": "...", "data": {...}}`.
///
/// Negotiation payloads (`offer`, `answer`, `candidate`) are opaque JSON and are
/// never inspected by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientEvent {
    Join {
        room: RoomId,
    },
    Leave {},
    SendMessage {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attachment: Option<String>,
        /// Temporary id of the sender's local placeholder, echoed back in `new_message`.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },
    DeleteMessage {
        msg_id: MessageId,
    },
    ToggleReaction {
        msg_id: MessageId,
        emoji: String,
    },
    Typing {
        room: RoomId,
        typing: bool,
    },
    Offer {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        offer: Value,
    },
    Answer {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        answer: Value,
    },
    #[serde(rename = "ice-candidate")]
    IceCandidate {
        room: RoomId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        target: Option<ConnectionId>,
        candidate: Value,
    },
    EndCall {
        room: RoomId,
    },
    SetStatus {
        status: String,
    },
}

/// A stored message plus the sender's placeholder id, if it supplied one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostedMessage {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    HangUp,
    PeerLeft,
}

/// Frames the server pushes to a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    Connected {
        username: String,
        connection_id: ConnectionId,
        ice_servers: Vec<IceServerConfig>,
    },
    NewMessage(PostedMessage),
    DeleteMessage {
        id: MessageId,
    },
    ReactionUpdate {
        id: MessageId,
        room: RoomId,
        reactions: Reactions,
    },
    UserTyping {
        room: RoomId,
        username: String,
        typing: bool,
    },
    UserJoined {
        room: RoomId,
        username: String,
    },
    UserLeft {
        room: RoomId,
        username: String,
    },
    Offer {
        room: RoomId,
        from: ConnectionId,
        offer: Value,
    },
    Answer {
        room: RoomId,
        from: ConnectionId,
        answer: Value,
    },
    #[serde(rename = "ice-candidate")]
    IceCandidate {
        room: RoomId,
        from: ConnectionId,
        candidate: Value,
    },
    /// Both peers offered at once; `winner` keeps the initiator role.
    CallGlare {
        room: RoomId,
        winner: ConnectionId,
    },
    CallBusy {
        room: RoomId,
    },
    EndCall {
        room: RoomId,
        reason: EndReason,
    },
    /// Sent to every connection, the author included.
    StatusUpdate(UserStatus),
    Error {
        kind: ErrorKind,
        message: String,
    },
}

impl ServerEvent {
    pub fn new_message(message: Message, client_id: Option<String>) -> Self {
        Self::NewMessage(PostedMessage { message, client_id })
    }

    pub fn error(err: &HuddleError) -> Self {
        Self::Error {
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "connected",
            Self::NewMessage(_) => "new_message",
            Self::DeleteMessage { .. } => "delete_message",
            Self::ReactionUpdate { .. } => "reaction_update",
            Self::UserTyping { .. } => "user_typing",
            Self::UserJoined { .. } => "user_joined",
            Self::UserLeft { .. } => "user_left",
            Self::Offer { .. } => "offer",
            Self::Answer { .. } => "answer",
            Self::IceCandidate { .. } => "ice-candidate",
            Self::CallGlare { .. } => "call_glare",
            Self::CallBusy { .. } => "call_busy",
            Self::EndCall { .. } => "end_call",
            Self::StatusUpdate(_) => "status_update",
            Self::Error { .. } => "error",
        }
    }
}
