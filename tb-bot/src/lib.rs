//! teambot - bot facade.
//!
//! Wires a [`BotConfig`] into an [`ApiClient`] and an [`Updater`]. The bot
//! verifies its token at construction by fetching its own identity, then
//! exposes the client for domain calls and spawns event streams on demand.
//!
//! ```no_run
//! use futures::StreamExt;
//! use tb_bot::Bot;
//! use tb_core::BotConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> tb_core::BotResult<()> {
//! let bot = Bot::new(BotConfig::load_default()?).await?;
//! let mut events = bot.updates(CancellationToken::new());
//! while let Some(event) = events.next().await {
//!     if let Some(message) = event.message() {
//!         let mut reply = message.reply("pong")?;
//!         bot.client().send_message(&mut reply).await?;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod bot;

// Re-export key types
pub use bot::Bot;
pub use tb_api::{ApiClient, Params, Transport};
pub use tb_core::{BotConfig, BotError, BotResult};
pub use tb_updates::{EventStream, PollerState, Updater};
