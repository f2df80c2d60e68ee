//! Shared helpers for HTTP integration tests.

#![allow(dead_code)]

use httpmock::MockServer;
use serde_json::{json, Value};

use tb_core::BotConfig;

pub const TOKEN: &str = "001.1234567890.0987654321:751619011";
pub const API_PREFIX: &str = "/bot/v1";

/// Config pointing at the mock server, with short poll settings.
pub fn test_config(server: &MockServer) -> BotConfig {
    let mut config = BotConfig::default();
    config.api.base_url = server.url(API_PREFIX);
    config.api.token = TOKEN.to_string();
    config.api.request_timeout_ms = 5_000;
    config.poller.poll_time_secs = 1;
    config.poller.retry_delay_ms = 50;
    config
}

/// Full endpoint path on the mock server.
pub fn path(endpoint: &str) -> String {
    format!("{API_PREFIX}{endpoint}")
}

pub fn self_get_body() -> Value {
    json!({
        "ok": true,
        "userId": "751619011",
        "nick": "echo_bot",
        "firstName": "Echo",
        "about": "Repeats what you say"
    })
}

/// Mount `/self/get` so `Bot::new` succeeds.
pub async fn mount_self_get(server: &MockServer) {
    server
        .mock_async(|when, then| {
            when.method(httpmock::Method::GET).path(path("/self/get"));
            then.status(200).json_body(self_get_body());
        })
        .await;
}
