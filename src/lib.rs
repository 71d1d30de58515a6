pub mod catalog;
pub mod chat;
pub mod config;
pub mod platform;
pub mod shared;
pub mod wizard;
