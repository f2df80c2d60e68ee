//! Application-wide constants.

use std::time::Duration;

/// Application name, used for platform directories.
pub const APP_NAME: &str = "teambot";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.icq.net/bot/v1";

/// Query/form parameter that carries the bot token on every request.
pub const TOKEN_PARAM: &str = "token";

/// Multipart field name for uploaded file content.
pub const FILE_FIELD: &str = "file";

/// Environment variable that overrides the configured token.
pub const TOKEN_ENV: &str = "TEAMBOT_TOKEN";

/// Default request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default server-side long-poll window in seconds.
pub const DEFAULT_POLL_TIME_SECS: u64 = 60;

/// Default pause after a failed poll, in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 3_000;

/// Slack added on top of the poll window when timing out an event request.
pub const POLL_TIMEOUT_SLACK: Duration = Duration::from_secs(10);

/// Voice file ids always start with this character.
pub const VOICE_FILE_ID_PREFIX: char = 'I';

/// File extensions the API accepts as voice messages.
pub const VOICE_EXTENSIONS: &[&str] = &["aac", "ogg", "m4a"];

/// Event type tags as they appear on the wire.
pub mod event_types {
    pub const NEW_MESSAGE: &str = "newMessage";
    pub const EDITED_MESSAGE: &str = "editedMessage";
    pub const DELETED_MESSAGE: &str = "deletedMessage";
    pub const PINNED_MESSAGE: &str = "pinnedMessage";
    pub const UNPINNED_MESSAGE: &str = "unpinnedMessage";
    pub const NEW_CHAT_MEMBERS: &str = "newChatMembers";
    pub const LEFT_CHAT_MEMBERS: &str = "leftChatMembers";
    pub const CALLBACK_QUERY: &str = "callbackQuery";

    /// All event types the library decodes into typed variants.
    pub const ALL: &[&str] = &[
        NEW_MESSAGE,
        EDITED_MESSAGE,
        DELETED_MESSAGE,
        PINNED_MESSAGE,
        UNPINNED_MESSAGE,
        NEW_CHAT_MEMBERS,
        LEFT_CHAT_MEMBERS,
        CALLBACK_QUERY,
    ];
}
