//! teambot models - serde data types exchanged with the bot API.
//!
//! This crate owns the wire shapes: chat and user metadata, file info,
//! outgoing message drafts with their inline keyboards and attachments,
//! and the incoming event sum type delivered by the poller.

pub mod models;

// Re-export key types
pub use models::chat::{Chat, ChatAction, ChatType};
pub use models::event::{Event, EventKind};
pub use models::file::{FileInfo, FileUpload};
pub use models::keyboard::{Button, ButtonStyle, Keyboard};
pub use models::message::{ButtonResponse, ContentType, Message, ParseMode};
pub use models::user::{BotInfo, ChatMember, Contact, Photo, User};
