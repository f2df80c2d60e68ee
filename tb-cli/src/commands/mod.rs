//! CLI command implementations.

pub mod chats;
pub mod files;
pub mod info;
pub mod listen;
pub mod messages;

use console::style;
use dialoguer::{Confirm, Password};
use serde::Serialize;

use tb_api::ApiClient;
use tb_core::config::BotConfig;
use tb_core::error::{BotError, BotResult};

/// Make sure a token is available, prompting for one on a terminal.
///
/// A prompted token can be saved to the default config file.
pub fn ensure_token(config: &mut BotConfig) -> BotResult<()> {
    if !config.api.token.is_empty() {
        return Ok(());
    }
    if !console::user_attended() {
        return Err(BotError::MissingConfig(
            "api.token (pass --token or set TEAMBOT_TOKEN)".into(),
        ));
    }

    let token: String = Password::new()
        .with_prompt("Bot token")
        .interact()
        .map_err(|e| BotError::Config(format!("token prompt failed: {e}")))?;
    config.api.token = token.trim().to_string();

    let save = Confirm::new()
        .with_prompt("Save token to the config file?")
        .default(false)
        .interact()
        .map_err(|e| BotError::Config(format!("token prompt failed: {e}")))?;
    if save {
        let path = BotConfig::default_config_path()?;
        config.save_to_file(&path)?;
        println!("  {} Config saved to {}", style("OK").green(), path.display());
    }
    Ok(())
}

/// Helper to create an API client from config.
pub fn create_api_client(config: &mut BotConfig) -> BotResult<ApiClient> {
    ensure_token(config)?;
    config.require_configured()?;
    ApiClient::new(&config.api)
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// Print a short confirmation line.
pub fn print_ok(what: &str) {
    println!("{} {what}", style("OK").green().bold());
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

/// Truncate a string to at most `max_chars` characters, appending an ellipsis
/// if truncated.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Single-line rendering of message text for tables and event logs.
pub fn one_line(s: &str, max_chars: usize) -> String {
    truncate(&s.replace(['\n', '\r'], " "), max_chars)
}
