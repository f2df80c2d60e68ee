//! API endpoint modules organized by category.
//!
//! Each module adds typed methods to [`crate::ApiClient`] for a group of
//! related endpoints. They only shape parameters and decode responses;
//! transport, authentication, and envelope checks live in the dispatcher.

pub mod chats;
pub mod events;
pub mod files;
pub mod messages;
pub mod myself;
