//! Listen command - print the live event stream.

use std::time::Duration;

use chrono::{Local, TimeZone};
use console::style;
use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use tb_api::ApiClient;
use tb_bot::Bot;
use tb_core::config::BotConfig;
use tb_core::error::BotResult;
use tb_models::{Contact, Event, EventKind};

use crate::OutputFormat;

pub async fn run(
    mut config: BotConfig,
    echo: bool,
    duration: Option<u64>,
    format: OutputFormat,
) -> BotResult<()> {
    super::ensure_token(&mut config)?;
    let bot = Bot::new(config).await?;
    let api = bot.client();
    let me = bot.info();

    let cancel = CancellationToken::new();
    spawn_stop_signal(cancel.clone(), duration.map(Duration::from_secs));

    let updater = bot.updater().with_error_hook(|e| {
        eprintln!("{} {e}", style("poll failed:").yellow());
    });
    let mut events = updater.spawn(cancel.clone());

    if matches!(format, OutputFormat::Text) {
        println!(
            "{} listening as @{} (Ctrl+C to stop)",
            style("teambot").bold(),
            me.nick
        );
    }

    let mut count = 0u64;
    while let Some(event) = events.next().await {
        count += 1;
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(&event).unwrap_or_default());
            }
            OutputFormat::Text => println!("{}", describe(&event)),
        }
        if echo {
            reply_to(api, &me.user_id, &event).await;
        }
    }

    if let Some(updater) = events.stop().await {
        info!("stopped after {count} event(s), cursor {}", updater.cursor());
    }
    Ok(())
}

/// Cancel on Ctrl+C or after `duration`, whichever comes first.
fn spawn_stop_signal(cancel: CancellationToken, duration: Option<Duration>) {
    tokio::spawn(async move {
        let deadline = async {
            match duration {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => info!("interrupted"),
            _ = deadline => info!("listen duration elapsed"),
            _ = cancel.cancelled() => {}
        }
        cancel.cancel();
    });
}

/// Echo text messages and acknowledge button presses. Errors are logged.
async fn reply_to(api: &ApiClient, own_id: &str, event: &Event) {
    let result = match &event.kind {
        EventKind::NewMessage(payload)
            if !payload.text.is_empty() && payload.from.user_id != own_id =>
        {
            match payload.to_message().reply(payload.text.clone()) {
                Ok(mut reply) => api.send_message(&mut reply).await,
                Err(e) => Err(e),
            }
        }
        EventKind::CallbackQuery(query) => {
            let answer = query
                .answer()
                .with_text(format!("pressed: {}", query.callback_data));
            api.answer_callback_query(&answer).await
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        warn!("echo for event {} failed: {e}", event.event_id);
    }
}

fn names(contacts: &[Contact]) -> String {
    contacts
        .iter()
        .map(Contact::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn timestamp(secs: i64) -> String {
    match Local.timestamp_opt(secs, 0).single() {
        Some(t) if secs > 0 => t.format("%H:%M:%S").to_string(),
        _ => "--:--:--".to_string(),
    }
}

/// One-line human-readable summary of an event.
pub fn describe(event: &Event) -> String {
    let chat = event
        .chat()
        .map(|c| c.display_name())
        .unwrap_or_else(|| "-".to_string());
    let kind = style(event.kind.type_name()).cyan();

    let detail = match &event.kind {
        EventKind::NewMessage(p) | EventKind::EditedMessage(p) | EventKind::PinnedMessage(p) => {
            let mut text = super::one_line(&p.text, 60);
            for part in &p.parts {
                text.push_str(&format!(" [{}]", part.type_name()));
            }
            return format!(
                "{} #{} {kind} [{chat}] {}: {text}",
                timestamp(p.timestamp),
                event.event_id,
                p.from.display_name()
            );
        }
        EventKind::DeletedMessage(r) | EventKind::UnpinnedMessage(r) => {
            format!("message {}", r.msg_id)
        }
        EventKind::NewChatMembers(m) => format!("joined: {}", names(&m.new_members)),
        EventKind::LeftChatMembers(m) => format!("left: {}", names(&m.left_members)),
        EventKind::CallbackQuery(q) => {
            format!("{} pressed {:?}", q.from.display_name(), q.callback_data)
        }
        EventKind::Unknown { .. } => String::new(),
    };
    format!("#{} {kind} [{chat}] {detail}", event.event_id)
}
