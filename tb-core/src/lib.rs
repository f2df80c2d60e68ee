//! teambot core - foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other teambot crates:
//! - Bot configuration (API endpoint, token, poller settings, logging)
//! - The error taxonomy shared by the dispatcher, the poller, and callers
//! - Structured logging with tracing
//! - Platform directory lookup and common constants

pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod platform;

// Re-export commonly used items at the crate root
pub use config::BotConfig;
pub use error::{BotError, BotResult};
pub use logging::init_logging;
pub use platform::Platform;
