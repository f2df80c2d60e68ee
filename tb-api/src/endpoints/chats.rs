//! Chat endpoints: info, members, moderation, settings, pins, actions.

use tb_core::error::{BotError, BotResult};
use tb_models::{Chat, ChatAction, ChatMember, User};

use crate::client::ApiClient;
use crate::request::Params;
use crate::response::{AdminsList, MembersList, UsersList};

/// Whose join request `/chats/resolvePending` resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingTarget {
    User(String),
    Everyone,
}

fn chat_params(chat_id: &str) -> BotResult<Params> {
    if chat_id.is_empty() {
        return Err(BotError::Usage("chat id is required".into()));
    }
    Ok(Params::new().with("chatId", chat_id))
}

impl ApiClient {
    /// Get chat metadata. Which fields are filled depends on the chat type.
    pub async fn get_chat_info(&self, chat_id: &str) -> BotResult<Chat> {
        let mut chat: Chat = self
            .dispatch("/chats/getInfo", chat_params(chat_id)?, None)
            .await?
            .decode()?;
        if chat.chat_id.is_empty() {
            chat.chat_id = chat_id.to_string();
        }
        Ok(chat)
    }

    /// Show activity indicators in a chat. Duplicates are dropped; an empty
    /// list clears the indicators.
    pub async fn send_chat_actions(&self, chat_id: &str, actions: &[ChatAction]) -> BotResult<()> {
        let mut params = chat_params(chat_id)?;
        let mut seen = Vec::with_capacity(actions.len());
        for action in actions {
            if !seen.contains(action) {
                seen.push(*action);
                params.add("actions", action.as_str());
            }
        }
        if seen.is_empty() {
            params.set("actions", "");
        }
        self.dispatch("/chats/sendActions", params, None).await?;
        Ok(())
    }

    pub async fn get_chat_admins(&self, chat_id: &str) -> BotResult<Vec<ChatMember>> {
        let list: AdminsList = self
            .dispatch("/chats/getAdmins", chat_params(chat_id)?, None)
            .await?
            .decode()?;
        Ok(list.admins)
    }

    pub async fn get_chat_members(&self, chat_id: &str) -> BotResult<Vec<ChatMember>> {
        Ok(self.get_chat_members_page(chat_id, None).await?.members)
    }

    /// One page of chat members, continuing from `cursor` when given.
    pub async fn get_chat_members_page(
        &self,
        chat_id: &str,
        cursor: Option<&str>,
    ) -> BotResult<MembersList> {
        let mut params = chat_params(chat_id)?;
        params.set_opt("cursor", cursor);
        self.dispatch("/chats/getMembers", params, None)
            .await?
            .decode()
    }

    pub async fn get_chat_blocked_users(&self, chat_id: &str) -> BotResult<Vec<User>> {
        self.user_list("/chats/getBlockedUsers", chat_id).await
    }

    /// Users waiting for a join request to be approved.
    pub async fn get_chat_pending_users(&self, chat_id: &str) -> BotResult<Vec<User>> {
        self.user_list("/chats/getPendingUsers", chat_id).await
    }

    /// Block a user, optionally deleting their latest messages.
    pub async fn block_chat_user(
        &self,
        chat_id: &str,
        user_id: &str,
        delete_last_messages: bool,
    ) -> BotResult<()> {
        let params = chat_params(chat_id)?
            .with("userId", user_id)
            .with("delLastMessages", delete_last_messages.to_string());
        self.dispatch("/chats/blockUser", params, None).await?;
        Ok(())
    }

    pub async fn unblock_chat_user(&self, chat_id: &str, user_id: &str) -> BotResult<()> {
        let params = chat_params(chat_id)?.with("userId", user_id);
        self.dispatch("/chats/unblockUser", params, None).await?;
        Ok(())
    }

    /// Approve or reject pending join requests.
    pub async fn resolve_chat_pending(
        &self,
        chat_id: &str,
        approve: bool,
        target: PendingTarget,
    ) -> BotResult<()> {
        let mut params = chat_params(chat_id)?.with("approve", approve.to_string());
        match target {
            PendingTarget::Everyone => params.set("everyone", "true"),
            PendingTarget::User(user_id) => params.set("userId", user_id),
        };
        self.dispatch("/chats/resolvePending", params, None).await?;
        Ok(())
    }

    pub async fn set_chat_title(&self, chat_id: &str, title: &str) -> BotResult<()> {
        self.set_chat_field("/chats/setTitle", chat_id, "title", title)
            .await
    }

    pub async fn set_chat_about(&self, chat_id: &str, about: &str) -> BotResult<()> {
        self.set_chat_field("/chats/setAbout", chat_id, "about", about)
            .await
    }

    pub async fn set_chat_rules(&self, chat_id: &str, rules: &str) -> BotResult<()> {
        self.set_chat_field("/chats/setRules", chat_id, "rules", rules)
            .await
    }

    pub async fn pin_message(&self, chat_id: &str, msg_id: &str) -> BotResult<()> {
        self.pin_call("/chats/pinMessage", chat_id, msg_id).await
    }

    pub async fn unpin_message(&self, chat_id: &str, msg_id: &str) -> BotResult<()> {
        self.pin_call("/chats/unpinMessage", chat_id, msg_id).await
    }

    async fn user_list(&self, path: &str, chat_id: &str) -> BotResult<Vec<User>> {
        let list: UsersList = self
            .dispatch(path, chat_params(chat_id)?, None)
            .await?
            .decode()?;
        Ok(list.users)
    }

    async fn set_chat_field(&self, path: &str, chat_id: &str, key: &str, value: &str) -> BotResult<()> {
        let params = chat_params(chat_id)?.with(key, value);
        self.dispatch(path, params, None).await?;
        Ok(())
    }

    async fn pin_call(&self, path: &str, chat_id: &str, msg_id: &str) -> BotResult<()> {
        if msg_id.is_empty() {
            return Err(BotError::Usage("message id is required".into()));
        }
        let params = chat_params(chat_id)?.with("msgId", msg_id);
        self.dispatch(path, params, None).await?;
        Ok(())
    }
}
