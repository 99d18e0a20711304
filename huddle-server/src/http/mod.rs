mod api;
mod api_error;
mod app_state;
mod requester;
mod routes;
mod upload;

pub use api::*;
pub use api_error::*;
pub use app_state::*;
pub use requester::*;
pub use routes::*;
pub use upload::*;
