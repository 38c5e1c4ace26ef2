mod auth;
mod error_handler;

pub use auth::{Principal, auth_middleware};
pub use error_handler::log_errors;
