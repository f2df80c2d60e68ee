//! Host directories and client identification.

use std::env::consts::{ARCH, OS};
use std::path::PathBuf;

use crate::constants::{APP_NAME, APP_VERSION};
use crate::error::{BotError, BotResult};

/// Where teambot keeps its files on this host.
pub struct Platform;

impl Platform {
    /// Per-user data directory, e.g. `~/.local/share/teambot`. Logs live here.
    pub fn data_dir() -> BotResult<PathBuf> {
        dirs::data_dir()
            .map(|base| base.join(APP_NAME))
            .ok_or_else(|| BotError::Config("could not determine data directory".into()))
    }

    /// Per-user config directory, e.g. `~/.config/teambot`.
    pub fn config_dir() -> BotResult<PathBuf> {
        dirs::config_dir()
            .map(|base| base.join(APP_NAME))
            .ok_or_else(|| BotError::Config("could not determine config directory".into()))
    }

    /// User-Agent header value sent with every request.
    pub fn user_agent() -> String {
        format!("{APP_NAME}/{APP_VERSION} ({OS}; {ARCH})")
    }
}
