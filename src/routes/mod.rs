pub mod reading_log;
pub mod summary;
pub mod user;
