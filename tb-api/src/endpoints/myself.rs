//! Bot identity endpoint.

use tb_core::error::BotResult;
use tb_models::BotInfo;

use crate::client::ApiClient;
use crate::request::Params;

impl ApiClient {
    /// Get the bot's own id, nick, name, description, and avatar.
    pub async fn get_info(&self) -> BotResult<BotInfo> {
        self.dispatch("/self/get", Params::new(), None)
            .await?
            .decode()
    }
}

#[cfg(test)]
mod tests {
    use crate::testing::{scripted_client, ScriptedTransport};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_info() {
        let transport = ScriptedTransport::new();
        transport.push_json(json!({
            "ok": true,
            "userId": "747432131",
            "nick": "test_api_bot",
            "firstName": "TestBot",
            "about": "The most awesome bot",
            "photo": [{ "url": "https://example.com/a.png" }]
        }));
        let client = scripted_client(transport.clone());

        let info = client.get_info().await.unwrap();
        assert_eq!(info.nick, "test_api_bot");
        assert_eq!(transport.requests()[0].url, "http://bot.test/bot/v1/self/get");
    }

    #[tokio::test]
    async fn test_get_info_invalid_token() {
        let transport = ScriptedTransport::new();
        transport.push_json(json!({ "ok": false, "description": "Invalid token" }));
        let client = scripted_client(transport);

        let err = client.get_info().await.unwrap_err();
        assert_eq!(err.description(), Some("Invalid token"));
    }
}
