mod handler;
pub mod model;

pub use handler::{create_log, list_child_logs, list_own_logs};
