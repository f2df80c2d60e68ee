//! Wire model definitions.

pub mod chat;
pub mod event;
pub mod file;
pub mod keyboard;
pub mod message;
pub mod part;
pub mod user;
