//! Outgoing message drafts and callback answers.
//!
//! A `Message` is plain data: it holds no client reference. Send it with the
//! client's message operations, which fill `msg_id` from the API response.

use chrono::{DateTime, Utc};

use tb_core::error::{BotError, BotResult};

use super::file::FileUpload;
use super::keyboard::Keyboard;

/// What a draft carries, deciding which endpoint sends it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentType {
    /// Auto-detect from the file id, the upload name, or the text.
    #[default]
    Unknown,
    Text,
    File,
    Voice,
}

/// Text formatting applied by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    Html,
    MarkdownV2,
}

impl ParseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseMode::Html => "HTML",
            ParseMode::MarkdownV2 => "MarkdownV2",
        }
    }
}

impl std::str::FromStr for ParseMode {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" => Ok(ParseMode::Html),
            "markdownv2" | "markdown" => Ok(ParseMode::MarkdownV2),
            other => Err(BotError::Usage(format!("unknown parse mode: {other}"))),
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing message, or a reference to one that was already sent.
#[derive(Debug, Clone, Default)]
pub struct Message {
    /// Set by the server once the message is sent.
    pub msg_id: String,
    pub chat_id: String,
    /// Message text, or the caption when sending a file.
    pub text: String,
    pub content_type: ContentType,
    /// Id of a file already stored on the server.
    pub file_id: Option<String>,
    /// New file content to upload.
    pub upload: Option<FileUpload>,
    pub reply_msg_id: Option<String>,
    pub forward_msg_id: Option<String>,
    pub forward_chat_id: Option<String>,
    pub keyboard: Option<Keyboard>,
    pub parse_mode: Option<ParseMode>,
    /// Unix seconds, for messages decoded from events.
    pub timestamp: i64,
}

impl Message {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            ..Self::default()
        }
    }

    pub fn text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            content_type: ContentType::Text,
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Attach new file content to upload.
    pub fn with_file(mut self, upload: FileUpload) -> Self {
        self.upload = Some(upload);
        self.content_type = ContentType::File;
        self
    }

    /// Attach a file already stored on the server.
    pub fn with_file_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self.content_type = ContentType::File;
        self
    }

    pub fn with_voice(mut self, upload: FileUpload) -> Self {
        self.upload = Some(upload);
        self.content_type = ContentType::Voice;
        self
    }

    pub fn with_voice_id(mut self, file_id: impl Into<String>) -> Self {
        self.file_id = Some(file_id.into());
        self.content_type = ContentType::Voice;
        self
    }

    pub fn with_reply_to(mut self, msg_id: impl Into<String>) -> Self {
        self.reply_msg_id = Some(msg_id.into());
        self
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    /// A text draft answering this message in the same chat.
    pub fn reply(&self, text: impl Into<String>) -> BotResult<Message> {
        self.require_id("reply to")?;
        Ok(Message::text(self.chat_id.clone(), text).with_reply_to(self.msg_id.clone()))
    }

    /// A draft forwarding this message into another chat.
    pub fn forward_to(&self, chat_id: impl Into<String>) -> BotResult<Message> {
        self.require_id("forward")?;
        let mut forward = Message::text(chat_id, self.text.clone());
        forward.forward_msg_id = Some(self.msg_id.clone());
        forward.forward_chat_id = Some(self.chat_id.clone());
        Ok(forward)
    }

    /// Fail unless the draft names a chat.
    pub fn require_chat(&self) -> BotResult<()> {
        if self.chat_id.is_empty() {
            return Err(BotError::Usage("message should have chat id".into()));
        }
        Ok(())
    }

    /// Fail unless the message was already sent, naming the refused action.
    pub fn require_id(&self, action: &str) -> BotResult<()> {
        if self.msg_id.is_empty() {
            return Err(BotError::Usage(format!("cannot {action} message without id")));
        }
        self.require_chat()
    }

    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        if self.timestamp == 0 {
            return None;
        }
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Answer to a `callbackQuery` event, sent with `/messages/answerCallbackQuery`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonResponse {
    pub query_id: String,
    /// Notification text shown to the user.
    pub text: String,
    /// Link the client should open instead of showing text.
    pub url: Option<String>,
    /// Show the text as a modal alert rather than a toast.
    pub show_alert: bool,
}

impl ButtonResponse {
    pub fn new(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            ..Self::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_alert(mut self, show_alert: bool) -> Self {
        self.show_alert = show_alert;
        self
    }
}
