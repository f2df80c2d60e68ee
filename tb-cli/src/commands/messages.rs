//! Message commands: send, edit, delete, pin.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

use tb_api::SendRoute;
use tb_core::config::BotConfig;
use tb_core::error::{BotError, BotResult};
use tb_models::{FileUpload, Message, ParseMode};

use crate::OutputFormat;

#[derive(Args)]
pub struct SendArgs {
    /// Chat id (user id, nick, or group id).
    pub chat: String,
    /// Message text, or the caption of a file.
    pub text: Option<String>,
    /// Upload a local file.
    #[arg(long, conflicts_with = "file_id")]
    pub file: Option<PathBuf>,
    /// Send a file already stored on the server.
    #[arg(long)]
    pub file_id: Option<String>,
    /// Send the file as a voice message.
    #[arg(long)]
    pub voice: bool,
    /// Reply to this message id.
    #[arg(long)]
    pub reply: Option<String>,
    /// Text formatting (HTML or MarkdownV2).
    #[arg(long)]
    pub parse_mode: Option<ParseMode>,
}

impl SendArgs {
    async fn into_message(self) -> BotResult<Message> {
        let mut message = Message::new(self.chat);
        if let Some(text) = self.text {
            message = message.with_text(text);
        }
        if let Some(path) = self.file {
            let upload = FileUpload::from_path(&path).await?;
            message = if self.voice {
                message.with_voice(upload)
            } else {
                message.with_file(upload)
            };
        } else if let Some(file_id) = self.file_id {
            message = if self.voice {
                message.with_voice_id(file_id)
            } else {
                message.with_file_id(file_id)
            };
        } else if self.voice {
            return Err(BotError::Usage("--voice needs --file or --file-id".into()));
        }
        if let Some(reply) = self.reply {
            message = message.with_reply_to(reply);
        }
        if let Some(mode) = self.parse_mode {
            message = message.with_parse_mode(mode);
        }
        Ok(message)
    }
}

fn upload_spinner(message: &Message) -> Option<ProgressBar> {
    let upload = message.upload.as_ref()?;
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("  Uploading {spinner} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!(
        "{} ({})",
        upload.name(),
        super::format_bytes(upload.len() as u64)
    ));
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

pub async fn send(mut config: BotConfig, args: SendArgs, format: OutputFormat) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    let mut message = args.into_message().await?;
    let route = SendRoute::for_message(&message)?;

    let spinner = upload_spinner(&message);
    let result = api.send_message(&mut message).await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    result?;

    match format {
        OutputFormat::Json => super::print_json(&json!({
            "msgId": message.msg_id,
            "fileId": message.file_id,
            "route": format!("{route:?}"),
        })),
        OutputFormat::Text => {
            super::print_ok(&format!("sent message {}", message.msg_id));
            if let Some(file_id) = &message.file_id {
                println!("  File ID: {file_id}");
            }
        }
    }
    Ok(())
}

pub async fn edit(
    mut config: BotConfig,
    chat: String,
    msg_id: String,
    text: String,
    format: OutputFormat,
) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    let mut message = Message::text(chat, text);
    message.msg_id = msg_id;
    api.edit_message(&message).await?;
    report(format, "edited", &[message.msg_id.as_str()]);
    Ok(())
}

pub async fn delete(
    mut config: BotConfig,
    chat: String,
    msg_ids: Vec<String>,
    format: OutputFormat,
) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    let ids: Vec<&str> = msg_ids.iter().map(String::as_str).collect();
    api.delete_messages(&chat, &ids).await?;
    report(format, "deleted", &ids);
    Ok(())
}

pub async fn pin(
    mut config: BotConfig,
    chat: String,
    msg_id: String,
    pin: bool,
    format: OutputFormat,
) -> BotResult<()> {
    let api = super::create_api_client(&mut config)?;
    if pin {
        api.pin_message(&chat, &msg_id).await?;
        report(format, "pinned", &[msg_id.as_str()]);
    } else {
        api.unpin_message(&chat, &msg_id).await?;
        report(format, "unpinned", &[msg_id.as_str()]);
    }
    Ok(())
}

fn report(format: OutputFormat, action: &str, ids: &[&str]) {
    match format {
        OutputFormat::Json => super::print_json(&json!({ "ok": true, action: ids })),
        OutputFormat::Text => super::print_ok(&format!("{action} {}", ids.join(", "))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tb_models::ContentType;

    fn args(chat: &str) -> SendArgs {
        SendArgs {
            chat: chat.into(),
            text: None,
            file: None,
            file_id: None,
            voice: false,
            reply: None,
            parse_mode: None,
        }
    }

    #[tokio::test]
    async fn test_voice_file_id_message() {
        let mut send = args("c");
        send.file_id = Some("I0001".into());
        send.voice = true;
        send.text = Some("listen".into());
        let message = send.into_message().await.unwrap();
        assert_eq!(message.content_type, ContentType::Voice);
        assert_eq!(SendRoute::for_message(&message).unwrap(), SendRoute::VoiceById);
    }

    #[tokio::test]
    async fn test_voice_without_file_is_rejected() {
        let mut send = args("c");
        send.voice = true;
        assert!(matches!(
            send.into_message().await,
            Err(BotError::Usage(_))
        ));
    }

    #[tokio::test]
    async fn test_text_with_reply_and_mode() {
        let mut send = args("c");
        send.text = Some("<b>hi</b>".into());
        send.reply = Some("42".into());
        send.parse_mode = Some(ParseMode::Html);
        let message = send.into_message().await.unwrap();
        assert_eq!(message.reply_msg_id.as_deref(), Some("42"));
        assert_eq!(SendRoute::for_message(&message).unwrap(), SendRoute::Text);
    }
}
