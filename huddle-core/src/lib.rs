mod error;
pub mod model;

pub use error::{ErrorKind, HuddleError};
pub use model::*;
