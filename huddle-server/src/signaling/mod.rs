mod event_sink;
mod gateway;
mod relay;
mod ws_handler;

pub use event_sink::*;
pub use gateway::*;
pub use relay::*;
pub use ws_handler::*;
