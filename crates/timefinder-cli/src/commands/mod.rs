pub mod config;
pub mod focus;
pub mod remind;
pub mod schedule;
pub mod task;
pub mod user;
