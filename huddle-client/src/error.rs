use huddle_core::MessageId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error("join a room first")]
    NoRoom,

    #[error("message must carry text or an attachment")]
    EmptyMessage,

    #[error("only the sender may delete message {0}")]
    NotOwner(MessageId),

    #[error("message {0} is not in view")]
    UnknownMessage(MessageId),

    #[error("status must be at most {0} characters")]
    StatusTooLong(usize),
}
