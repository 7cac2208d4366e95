pub mod guard;
pub mod service;
pub mod token;
