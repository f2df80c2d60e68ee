//! Chat metadata model.

use serde::{Deserialize, Serialize};

/// Kind of chat.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Channel,
    #[default]
    #[serde(other)]
    Unknown,
}

impl ChatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatType::Private => "private",
            ChatType::Group => "group",
            ChatType::Channel => "channel",
            ChatType::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ChatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a chat as returned by `/chats/getInfo` or embedded in events.
///
/// Events only carry `chatId`, `type` and `title`; the remaining fields are
/// filled by `/chats/getInfo` and depend on the chat type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(default)]
    pub chat_id: String,
    #[serde(rename = "type", default)]
    pub chat_type: ChatType,

    // Private chats
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub nick: String,
    #[serde(default)]
    pub is_bot: bool,

    // Groups and channels
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub about: String,
    #[serde(default)]
    pub rules: String,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub join_moderation: bool,
    #[serde(default)]
    pub invite_link: String,
}

impl Chat {
    /// A chat reference carrying only its id.
    pub fn with_id(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    /// Human-readable name: the title for groups and channels, the person's
    /// name or nick for private chats, the id as a last resort.
    pub fn display_name(&self) -> String {
        if !self.title.is_empty() {
            return self.title.clone();
        }
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if !full.is_empty() {
            full.to_string()
        } else if !self.nick.is_empty() {
            self.nick.clone()
        } else {
            self.chat_id.clone()
        }
    }
}

/// Activity indicator shown to chat members via `/chats/sendActions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatAction {
    Typing,
    Looking,
}

impl ChatAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatAction::Typing => "typing",
            ChatAction::Looking => "looking",
        }
    }
}

impl std::str::FromStr for ChatAction {
    type Err = tb_core::BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "typing" => Ok(ChatAction::Typing),
            "looking" => Ok(ChatAction::Looking),
            other => Err(tb_core::BotError::Usage(format!(
                "unknown chat action: {other}"
            ))),
        }
    }
}
