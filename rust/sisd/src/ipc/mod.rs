mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use router::handle_request;
pub use error::bad_json;
pub use types::{AppState, Request};
