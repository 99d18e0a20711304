mod history_store;
mod message_bus;

pub use history_store::*;
pub use message_bus::*;
