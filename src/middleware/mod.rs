pub mod activity_log;
pub mod classify;
pub mod recorder;
