//! User, contact, and bot identity models.

use serde::{Deserialize, Serialize};

/// A bare user reference, as returned by the blocked/pending user lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub user_id: String,
}

/// A user with display names, as embedded in events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl Contact {
    /// "First Last", falling back to the user id when both names are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.user_id.clone()
        } else {
            full.to_string()
        }
    }
}

/// A chat member entry from `/chats/getMembers` or `/chats/getAdmins`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMember {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub creator: bool,
    #[serde(default)]
    pub admin: bool,
}

/// An avatar reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    #[serde(default)]
    pub url: String,
}

/// The bot's own identity, from `/self/get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub photo: Vec<Photo>,
}
