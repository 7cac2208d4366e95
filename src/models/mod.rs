pub mod activity;
pub mod restaurant;
pub mod user;
