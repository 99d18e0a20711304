mod chat;
mod config;
mod http;
mod hub;
mod registry;
mod room;
mod signaling;
mod status;
mod typing;

pub use chat::*;
pub use config::*;
pub use http::*;
pub use hub::*;
pub use registry::*;
pub use room::*;
pub use signaling::*;
pub use status::*;
pub use typing::*;
