use crate::model::{ConnectionId, MessageId, RoomId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HuddleError {
    #[error("message must carry text or an attachment")]
    EmptyMessage,

    #[error("invalid room id '{0}'")]
    InvalidRoom(String),

    #[error("invalid reaction emoji")]
    InvalidEmoji,

    #[error("invalid username '{0}'")]
    InvalidUsername(String),

    #[error("status must be at most {0} characters")]
    StatusTooLong(usize),

    #[error("malformed event: {0}")]
    MalformedEvent(String),

    #[error("not a member of room '{0}'")]
    NotInRoom(RoomId),

    #[error("join a room first")]
    NoRoom,

    #[error("only the sender may delete message {0}")]
    Forbidden(MessageId),

    #[error("message {0} not found")]
    MessageNotFound(MessageId),

    #[error("connection {0} not found")]
    ConnectionNotFound(ConnectionId),

    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("signaling conflict: {0}")]
    StateConflict(&'static str),

    #[error("room '{0}' is unavailable")]
    RoomUnavailable(RoomId),
}

/// Coarse error class sent to clients alongside the message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Forbidden,
    NotFound,
    StateConflict,
    DuplicateConnection,
    Unavailable,
}

impl HuddleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyMessage
            | Self::InvalidRoom(_)
            | Self::InvalidEmoji
            | Self::InvalidUsername(_)
            | Self::StatusTooLong(_)
            | Self::MalformedEvent(_)
            | Self::NotInRoom(_)
            | Self::NoRoom => ErrorKind::Validation,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::MessageNotFound(_) | Self::ConnectionNotFound(_) => ErrorKind::NotFound,
            Self::DuplicateConnection(_) => ErrorKind::DuplicateConnection,
            Self::StateConflict(_) => ErrorKind::StateConflict,
            Self::RoomUnavailable(_) => ErrorKind::Unavailable,
        }
    }
}
