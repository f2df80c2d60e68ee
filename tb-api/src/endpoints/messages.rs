//! Message endpoints: send, edit, delete, files, voice, callback answers.

use tb_core::constants::VOICE_FILE_ID_PREFIX;
use tb_core::error::{BotError, BotResult};
use tb_models::{ButtonResponse, ContentType, FileUpload, Message};

use crate::client::ApiClient;
use crate::request::Params;
use crate::response::SentMessage;

/// Which endpoint a draft goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRoute {
    Text,
    FileById,
    UploadFile,
    VoiceById,
    UploadVoice,
}

impl SendRoute {
    /// Pick the endpoint for a draft.
    ///
    /// An explicit content type wins. Otherwise a stored file id starting
    /// with `I` is voice, an upload with a voice extension is voice, any
    /// other file is a file, and plain text is text.
    pub fn for_message(message: &Message) -> BotResult<Self> {
        let has_id = message.file_id.as_deref().is_some_and(|id| !id.is_empty());
        let route = match message.content_type {
            ContentType::Voice if has_id => Some(SendRoute::VoiceById),
            ContentType::Voice if message.upload.is_some() => Some(SendRoute::UploadVoice),
            ContentType::File if has_id => Some(SendRoute::FileById),
            ContentType::File if message.upload.is_some() => Some(SendRoute::UploadFile),
            ContentType::Text => Some(SendRoute::Text),
            ContentType::Unknown => Self::detect(message, has_id),
            _ => None,
        };
        route.ok_or_else(|| BotError::Usage("cannot send message or file without data".into()))
    }

    fn detect(message: &Message, has_id: bool) -> Option<Self> {
        if has_id {
            let voice = message
                .file_id
                .as_deref()
                .is_some_and(|id| id.starts_with(VOICE_FILE_ID_PREFIX));
            return Some(if voice {
                SendRoute::VoiceById
            } else {
                SendRoute::FileById
            });
        }
        if let Some(upload) = &message.upload {
            return Some(if upload.is_voice() {
                SendRoute::UploadVoice
            } else {
                SendRoute::UploadFile
            });
        }
        if !message.text.is_empty() {
            return Some(SendRoute::Text);
        }
        None
    }
}

/// Parameters shared by every send: chat, reply or forward, keyboard, format.
fn delivery_params(message: &Message) -> BotResult<Params> {
    let mut params = Params::new().with("chatId", message.chat_id.as_str());
    params.set_opt("replyMsgId", message.reply_msg_id.as_deref());
    if let Some(forward_msg_id) = message.forward_msg_id.as_deref() {
        params.set("forwardMsgId", forward_msg_id);
        params.set_opt("forwardChatId", message.forward_chat_id.as_deref());
    }
    if let Some(keyboard) = &message.keyboard {
        params.set("inlineKeyboardMarkup", keyboard.to_markup()?);
    }
    params.set_opt("parseMode", message.parse_mode.map(|m| m.as_str()));
    Ok(params)
}

impl ApiClient {
    /// Send a draft through the endpoint its content selects, filling
    /// `msg_id` (and `file_id` for uploads) from the response.
    pub async fn send_message(&self, message: &mut Message) -> BotResult<()> {
        message.require_chat()?;
        match SendRoute::for_message(message)? {
            SendRoute::Text => self.send_text(message).await,
            SendRoute::FileById => self.send_file(message).await,
            SendRoute::UploadFile => self.upload_file(message).await,
            SendRoute::VoiceById => self.send_voice(message).await,
            SendRoute::UploadVoice => self.upload_voice(message).await,
        }
    }

    pub async fn send_text(&self, message: &mut Message) -> BotResult<()> {
        message.require_chat()?;
        let params = delivery_params(message)?.with("text", message.text.as_str());
        self.deliver("/messages/sendText", params, None, message)
            .await
    }

    /// Send a file already stored on the server, by id.
    pub async fn send_file(&self, message: &mut Message) -> BotResult<()> {
        self.send_stored("/messages/sendFile", message).await
    }

    /// Send a voice message already stored on the server, by id.
    pub async fn send_voice(&self, message: &mut Message) -> BotResult<()> {
        self.send_stored("/messages/sendVoice", message).await
    }

    /// Upload the draft's attachment as a file. The upload is consumed.
    pub async fn upload_file(&self, message: &mut Message) -> BotResult<()> {
        self.send_upload("/messages/sendFile", message).await
    }

    /// Upload the draft's attachment as a voice message. The upload is consumed.
    pub async fn upload_voice(&self, message: &mut Message) -> BotResult<()> {
        self.send_upload("/messages/sendVoice", message).await
    }

    /// Replace the text (and keyboard) of a sent message.
    pub async fn edit_message(&self, message: &Message) -> BotResult<()> {
        message.require_id("edit")?;
        let mut params = Params::new()
            .with("msgId", message.msg_id.as_str())
            .with("chatId", message.chat_id.as_str())
            .with("text", message.text.as_str());
        if let Some(keyboard) = &message.keyboard {
            params.set("inlineKeyboardMarkup", keyboard.to_markup()?);
        }
        params.set_opt("parseMode", message.parse_mode.map(|m| m.as_str()));
        self.dispatch("/messages/editText", params, None).await?;
        Ok(())
    }

    pub async fn delete_message(&self, message: &Message) -> BotResult<()> {
        message.require_id("delete")?;
        self.delete_messages(&message.chat_id, &[message.msg_id.as_str()])
            .await
    }

    /// Delete several messages of one chat in a single call.
    pub async fn delete_messages(&self, chat_id: &str, msg_ids: &[&str]) -> BotResult<()> {
        if chat_id.is_empty() || msg_ids.is_empty() {
            return Err(BotError::Usage(
                "deleting messages needs a chat id and at least one message id".into(),
            ));
        }
        let mut params = Params::new().with("chatId", chat_id);
        for id in msg_ids {
            params.add("msgId", *id);
        }
        self.dispatch("/messages/deleteMessages", params, None).await?;
        Ok(())
    }

    /// Answer a `callbackQuery` event.
    pub async fn answer_callback_query(&self, answer: &ButtonResponse) -> BotResult<()> {
        if answer.query_id.is_empty() {
            return Err(BotError::Usage("callback answer needs a query id".into()));
        }
        let mut params = Params::new()
            .with("queryId", answer.query_id.as_str())
            .with("text", answer.text.as_str())
            .with("showAlert", answer.show_alert.to_string());
        params.set_opt("url", answer.url.as_deref());
        self.dispatch("/messages/answerCallbackQuery", params, None)
            .await?;
        Ok(())
    }

    async fn send_stored(&self, path: &str, message: &mut Message) -> BotResult<()> {
        message.require_chat()?;
        let file_id = message
            .file_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BotError::Usage("message has no file id to send".into()))?;
        let params = delivery_params(message)?
            .with("caption", message.text.as_str())
            .with("fileId", file_id);
        self.deliver(path, params, None, message).await
    }

    async fn send_upload(&self, path: &str, message: &mut Message) -> BotResult<()> {
        message.require_chat()?;
        let params = delivery_params(message)?.with("caption", message.text.as_str());
        let upload = message
            .upload
            .take()
            .ok_or_else(|| BotError::Usage("message has no file to upload".into()))?;
        self.deliver(path, params, Some(upload), message).await
    }

    /// Dispatch a send and record the ids the server assigned.
    async fn deliver(
        &self,
        path: &str,
        params: Params,
        upload: Option<FileUpload>,
        message: &mut Message,
    ) -> BotResult<()> {
        let sent: SentMessage = self.dispatch(path, params, upload).await?.decode()?;
        message.msg_id = sent.msg_id;
        if let Some(file_id) = sent.file_id {
            message.file_id = Some(file_id);
        }
        Ok(())
    }
}
