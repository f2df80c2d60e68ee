//! Error types shared across the teambot workspace.
//!
//! Every failure a caller can observe is one `BotError` variant. The variants
//! fall into four classes: transport (no response body was obtained), decode
//! (a body arrived but had the wrong shape), API (the envelope said `ok=false`),
//! and usage (rejected before any network call).

use thiserror::Error;

/// Convenience type alias for Results using BotError.
pub type BotResult<T> = Result<T, BotError>;

/// Unified error type for the bot API client.
#[derive(Error, Debug)]
pub enum BotError {
    // -- Transport errors --
    /// The request could not be completed: connection refused, reset, DNS,
    /// or the body could not be read.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request did not complete within its timeout.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The caller's cancellation token fired before the response arrived.
    #[error("request cancelled")]
    Cancelled,

    // -- Response errors --
    /// The response body did not match the expected envelope or payload shape.
    #[error("{context}: cannot decode response: {message}")]
    Decode {
        /// Where the decode happened, usually the endpoint path.
        context: String,
        /// Decoder message.
        message: String,
    },

    /// The envelope decoded but reported `ok=false`.
    ///
    /// The raw body is kept so callers can still inspect partial data.
    #[error("{path}: error status from API: {description}")]
    Api {
        /// Endpoint path of the failed call.
        path: String,
        /// Server-supplied description.
        description: String,
        /// The literal response body.
        body: Vec<u8>,
    },

    // -- Caller errors --
    /// The operation was rejected before any request was made.
    #[error("usage error: {0}")]
    Usage(String),

    // -- Configuration errors --
    /// Failed to load or parse configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BotError {
    /// Build a decode error for the given context.
    pub fn decode(context: impl Into<String>, message: impl ToString) -> Self {
        BotError::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Whether the failure happened before a response body was obtained.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            BotError::Transport(_) | BotError::Timeout(_) | BotError::Cancelled
        )
    }

    /// The raw response body carried by an API error.
    pub fn raw_body(&self) -> Option<&[u8]> {
        match self {
            BotError::Api { body, .. } => Some(body),
            _ => None,
        }
    }

    /// The server description carried by an API error.
    pub fn description(&self) -> Option<&str> {
        match self {
            BotError::Api { description, .. } => Some(description),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::decode("json", e)
    }
}

impl From<toml::de::Error> for BotError {
    fn from(e: toml::de::Error) -> Self {
        BotError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display_contains_description() {
        let err = BotError::Api {
            path: "/messages/sendText".into(),
            description: "Missing required parameter 'token'".into(),
            body: br#"{"ok":false}"#.to_vec(),
        };
        assert_eq!(
            err.to_string(),
            "/messages/sendText: error status from API: Missing required parameter 'token'"
        );
        assert_eq!(err.raw_body(), Some(&br#"{"ok":false}"#[..]));
        assert_eq!(err.description(), Some("Missing required parameter 'token'"));
    }

    #[test]
    fn test_transport_classification() {
        assert!(BotError::Transport("refused".into()).is_transport());
        assert!(BotError::Timeout("30s".into()).is_transport());
        assert!(BotError::Cancelled.is_transport());
        assert!(!BotError::Usage("no chat id".into()).is_transport());
        assert!(!BotError::decode("/events/get", "eof").is_transport());
    }

    #[test]
    fn test_serde_error_becomes_decode() {
        let err: BotError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(matches!(err, BotError::Decode { .. }));
        assert!(err.raw_body().is_none());
    }

    #[test]
    fn test_config_error_display() {
        let err = BotError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");
    }
}
