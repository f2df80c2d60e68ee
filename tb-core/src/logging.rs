//! Structured logging setup using the `tracing` ecosystem.
//!
//! The library crates only emit `tracing` events; installing a subscriber is
//! left to the binary. Request URLs and response bodies are logged at `debug`,
//! poller state changes at `info`, poll failures at `warn`.

use std::path::Path;

use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::BotResult;

/// Build the level filter. `RUST_LOG` wins over the configured level.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber: compact console output on stderr
/// plus a daily-rotated file in `log_dir`.
///
/// The file layer is JSON when `config.json_output` is set.
pub fn init_logging(config: &LoggingConfig, log_dir: &Path) -> BotResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let file_appender = rolling::daily(log_dir, "teambot.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    let registry = tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(console_layer);

    if config.json_output {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(non_blocking)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .init();
    }

    tracing::info!(
        "logging initialized at level={}, dir={}",
        config.level,
        log_dir.display()
    );

    Ok(LogGuard { _guard: guard })
}

/// Guard that keeps the non-blocking log writer alive.
/// Drop this to flush and close the log file.
pub struct LogGuard {
    _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Initialize a console-only logger for tests or short CLI runs.
///
/// Subsequent calls are no-ops.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).compact())
        .try_init();
}
