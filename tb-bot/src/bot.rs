//! The [`Bot`] facade.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use tb_api::{ApiClient, Transport};
use tb_core::config::BotConfig;
use tb_core::error::BotResult;
use tb_models::BotInfo;
use tb_updates::{EventStream, Updater};

/// A configured bot: an API client, its identity, and poller settings.
///
/// Cloning is cheap and clones share the client's connection pool.
#[derive(Clone)]
pub struct Bot {
    client: ApiClient,
    config: BotConfig,
    info: BotInfo,
}

impl Bot {
    /// Build the client from `config` and verify the token with `/self/get`.
    pub async fn new(config: BotConfig) -> BotResult<Self> {
        config.require_configured()?;
        let client = ApiClient::new(&config.api)?;
        Self::start(client, config).await
    }

    /// Like [`Bot::new`], sending requests through `transport`.
    pub async fn with_transport(config: BotConfig, transport: Arc<dyn Transport>) -> BotResult<Self> {
        config.require_configured()?;
        let client = ApiClient::with_transport(&config.api, transport)?;
        Self::start(client, config).await
    }

    async fn start(client: ApiClient, config: BotConfig) -> BotResult<Self> {
        let info = client.get_info().await?;
        info!(
            "bot {} (@{}) ready at {}",
            info.user_id,
            info.nick,
            client.base_url()
        );
        Ok(Self {
            client,
            config,
            info,
        })
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Identity fetched at construction.
    pub fn info(&self) -> &BotInfo {
        &self.info
    }

    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// A fresh updater using the configured poller settings, starting at cursor 0.
    pub fn updater(&self) -> Updater {
        Updater::new(self.client.clone(), &self.config.poller)
    }

    /// Start polling for events in the background.
    pub fn updates(&self, cancel: CancellationToken) -> EventStream {
        self.updater().spawn(cancel)
    }
}

impl std::fmt::Debug for Bot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bot")
            .field("client", &self.client)
            .field("user_id", &self.info.user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;
    use tb_api::testing::{ScriptedTransport, TEST_BASE_URL, TEST_TOKEN};
    use tb_core::error::BotError;

    fn test_config() -> BotConfig {
        let mut config = BotConfig::default();
        config.api.base_url = TEST_BASE_URL.into();
        config.api.token = TEST_TOKEN.into();
        config
    }

    fn self_get() -> serde_json::Value {
        json!({ "ok": true, "userId": "747432131", "nick": "test_api_bot", "firstName": "TestBot" })
    }

    #[tokio::test]
    async fn test_new_fetches_identity() {
        let transport = ScriptedTransport::new();
        transport.push_json(self_get());

        let bot = Bot::with_transport(test_config(), transport.clone()).await.unwrap();
        assert_eq!(bot.info().nick, "test_api_bot");
        assert!(transport.requests()[0].url.ends_with("/self/get"));
    }

    #[tokio::test]
    async fn test_bad_token_fails_construction() {
        let transport = ScriptedTransport::new();
        transport.push_body(401, r#"{"ok":false,"description":"Invalid token"}"#);

        let err = Bot::with_transport(test_config(), transport).await.unwrap_err();
        assert!(matches!(err, BotError::Api { .. }));
        assert!(err.to_string().contains("Invalid token"));
    }

    #[tokio::test]
    async fn test_missing_token_sends_nothing() {
        let transport = ScriptedTransport::new();
        let mut config = test_config();
        config.api.token.clear();

        let err = Bot::with_transport(config, transport.clone()).await.unwrap_err();
        assert!(matches!(err, BotError::MissingConfig(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_use_poller_config() {
        let transport = ScriptedTransport::new();
        transport.push_json(self_get()).push_events(&[1]);
        let mut config = test_config();
        config.poller.poll_time_secs = 15;

        let bot = Bot::with_transport(config, transport.clone()).await.unwrap();
        let cancel = CancellationToken::new();
        let mut events = bot.updates(cancel.clone());
        assert_eq!(events.next().await.unwrap().event_id, 1);
        cancel.cancel();

        assert_eq!(transport.requests()[1].params.get("pollTime"), Some("15"));
    }
}
