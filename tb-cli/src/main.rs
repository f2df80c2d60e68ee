//! teambot CLI - command-line client for the bot API.
//!
//! Sends and edits messages, administers chats, inspects files, and listens
//! to the live event stream from the terminal. Handy for scripting and for
//! poking at a bot token before writing code against it.

mod commands;

use std::path::Path;

use clap::{Parser, Subcommand};
use tracing::debug;

use tb_core::config::BotConfig;
use tb_core::error::BotResult;
use tb_core::logging;

/// teambot - talk to the bot API from your terminal.
#[derive(Parser)]
#[command(
    name = "teambot",
    version,
    about = "Bot API command-line client",
    long_about = "A command-line client for the bot HTTP API.\n\
                  Send messages, manage chats, and watch incoming events with a bot token."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json).
    #[arg(short = 'f', long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Bot token (overrides config and TEAMBOT_TOKEN).
    #[arg(long, global = true)]
    token: Option<String>,

    /// API base URL (overrides config).
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// JSON output for scripting.
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the bot's own identity.
    Info,
    /// Send a text, a file, or a voice message.
    Send(commands::messages::SendArgs),
    /// Replace the text of a sent message.
    Edit {
        /// Chat id.
        chat: String,
        /// Message id.
        msg_id: String,
        /// New text.
        text: String,
    },
    /// Delete one or more messages.
    Delete {
        /// Chat id.
        chat: String,
        /// Message ids.
        #[arg(required = true)]
        msg_ids: Vec<String>,
    },
    /// Pin a message.
    Pin {
        /// Chat id.
        chat: String,
        /// Message id.
        msg_id: String,
    },
    /// Unpin a message.
    Unpin {
        /// Chat id.
        chat: String,
        /// Message id.
        msg_id: String,
    },
    /// Inspect and administer a chat.
    Chat {
        #[command(subcommand)]
        action: commands::chats::ChatCommand,
    },
    /// Show metadata of a stored file.
    FileInfo {
        /// File id.
        file_id: String,
    },
    /// Print incoming events until interrupted.
    Listen {
        /// Reply to every text message with the same text.
        #[arg(long)]
        echo: bool,
        /// Stop after this many seconds.
        #[arg(short, long)]
        duration: Option<u64>,
        /// Ignore events that were pending before startup.
        #[arg(long)]
        skip_backlog: bool,
    },
}

#[tokio::main]
async fn main() -> BotResult<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match cli.config.as_deref() {
        Some(path) => {
            let mut config = BotConfig::load_from_file(Path::new(path))?;
            config.apply_env();
            config
        }
        None => BotConfig::load_default()?,
    };
    if let Some(token) = cli.token {
        config.api.token = token;
    }
    if let Some(url) = cli.api_url {
        config.api.base_url = BotConfig::sanitize_base_url(&url);
    }

    // Initialize logging
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    let log_dir = config
        .effective_log_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("logs"));
    let _guard = logging::init_logging(&config.logging, &log_dir)?;

    debug!("teambot CLI v{}", tb_core::constants::APP_VERSION);

    let format = cli.format;
    match cli.command {
        Commands::Info => commands::info::run(config, format).await,
        Commands::Send(args) => commands::messages::send(config, args, format).await,
        Commands::Edit { chat, msg_id, text } => {
            commands::messages::edit(config, chat, msg_id, text, format).await
        }
        Commands::Delete { chat, msg_ids } => {
            commands::messages::delete(config, chat, msg_ids, format).await
        }
        Commands::Pin { chat, msg_id } => {
            commands::messages::pin(config, chat, msg_id, true, format).await
        }
        Commands::Unpin { chat, msg_id } => {
            commands::messages::pin(config, chat, msg_id, false, format).await
        }
        Commands::Chat { action } => commands::chats::run(config, action, format).await,
        Commands::FileInfo { file_id } => commands::files::run(config, file_id, format).await,
        Commands::Listen {
            echo,
            duration,
            skip_backlog,
        } => {
            if skip_backlog {
                config.poller.skip_backlog = true;
            }
            commands::listen::run(config, echo, duration, format).await
        }
    }
}
