mod handler;
pub mod model;

pub use handler::{child_login, create_child, list_children, parent_login, register};
