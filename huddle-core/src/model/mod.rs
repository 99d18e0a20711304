mod connection;
mod event;
mod message;
mod room;
mod signaling;
mod status;

pub use connection::ConnectionId;
pub use event::{ClientEvent, EndReason, PostedMessage, ServerEvent};
pub use message::{Message, MessageId, Reactions};
pub use room::{DEFAULT_ROOM, RoomId};
pub use signaling::IceServerConfig;
pub use status::{MAX_STATUS_CHARS, UserStatus};
