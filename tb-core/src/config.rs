//! Bot configuration.
//!
//! Everything the client and poller need is supplied once at construction
//! and never mutated afterwards. Configuration is persisted as TOML on disk;
//! the token may also come from the `TEAMBOT_TOKEN` environment variable.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{BotError, BotResult};
use crate::platform::Platform;

/// Top-level bot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// API endpoint and credentials.
    #[serde(default)]
    pub api: ApiConfig,

    /// Event poller settings.
    #[serde(default)]
    pub poller: PollerConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API endpoint and credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bot token, sent as the `token` parameter of every request.
    #[serde(default)]
    pub token: String,

    /// Timeout for ordinary requests in milliseconds. Zero selects the default.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,

    /// Accept invalid TLS certificates (self-hosted test servers only).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

/// Event poller settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Server-side long-poll window in seconds. Zero selects the default.
    #[serde(default = "default_poll_time")]
    pub poll_time_secs: u64,

    /// Fixed pause after a failed poll, in milliseconds. Zero selects the default.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Discard events that were pending before the poller started.
    #[serde(default)]
    pub skip_backlog: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, uses the platform data directory.
    #[serde(default)]
    pub directory: String,

    /// Write the log file as JSON lines.
    #[serde(default)]
    pub json_output: bool,
}

fn default_base_url() -> String {
    constants::DEFAULT_API_URL.to_string()
}

fn default_request_timeout() -> u64 {
    constants::DEFAULT_REQUEST_TIMEOUT_MS
}

fn default_poll_time() -> u64 {
    constants::DEFAULT_POLL_TIME_SECS
}

fn default_retry_delay() -> u64 {
    constants::DEFAULT_RETRY_DELAY_MS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: String::new(),
            request_timeout_ms: default_request_timeout(),
            accept_invalid_certs: false,
        }
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_time_secs: default_poll_time(),
            retry_delay_ms: default_retry_delay(),
            skip_backlog: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl ApiConfig {
    /// Build an API config for the given token against the default endpoint.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }

    /// Timeout applied to ordinary requests.
    pub fn request_timeout(&self) -> Duration {
        match self.request_timeout_ms {
            0 => Duration::from_millis(constants::DEFAULT_REQUEST_TIMEOUT_MS),
            ms => Duration::from_millis(ms),
        }
    }
}

impl PollerConfig {
    /// The long-poll window sent as `pollTime`.
    pub fn poll_time(&self) -> Duration {
        if self.poll_time_secs == 0 {
            Duration::from_secs(constants::DEFAULT_POLL_TIME_SECS)
        } else {
            Duration::from_secs(self.poll_time_secs)
        }
    }

    /// Pause between a failed poll and the next attempt.
    pub fn retry_delay(&self) -> Duration {
        match self.retry_delay_ms {
            0 => Duration::from_millis(constants::DEFAULT_RETRY_DELAY_MS),
            ms => Duration::from_millis(ms),
        }
    }
}

impl BotConfig {
    /// Load configuration from the default config file path, falling back to
    /// defaults when no file exists. The environment token override applies.
    pub fn load_default() -> BotResult<Self> {
        let path = Self::default_config_path()?;
        let mut config = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> BotResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: BotConfig = toml::from_str(&contents)?;
        config.api.base_url = Self::sanitize_base_url(&config.api.base_url);
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> BotResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| BotError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> BotResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Get the effective log directory, using the configured path or the default.
    pub fn effective_log_dir(&self) -> BotResult<PathBuf> {
        if self.logging.directory.is_empty() {
            Ok(Platform::data_dir()?.join("logs"))
        } else {
            Ok(PathBuf::from(&self.logging.directory))
        }
    }

    /// Override the token from `TEAMBOT_TOKEN` when it is set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(constants::TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.api.token = token.trim().to_string();
            }
        }
    }

    /// Check whether enough is configured to talk to the API.
    pub fn is_configured(&self) -> bool {
        !self.api.base_url.is_empty() && !self.api.token.is_empty()
    }

    /// Fail with `MissingConfig` unless a token and endpoint are present.
    pub fn require_configured(&self) -> BotResult<()> {
        if self.api.token.is_empty() {
            return Err(BotError::MissingConfig("api.token".into()));
        }
        if self.api.base_url.is_empty() {
            return Err(BotError::MissingConfig("api.base_url".into()));
        }
        Ok(())
    }

    /// Normalize a base URL: trim whitespace and quotes, default to https,
    /// strip trailing slashes.
    pub fn sanitize_base_url(address: &str) -> String {
        let trimmed = address.trim().trim_matches('"').trim();
        if trimmed.is_empty() {
            return String::new();
        }

        let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };

        with_scheme.trim_end_matches('/').to_string()
    }
}
