//! Scripted in-memory transport.
//!
//! Replies are served in the order they were pushed and every request is
//! recorded for inspection. Once the script runs out, requests stall until
//! they are cancelled or time out, like a long poll with nothing to deliver.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{json, Value};

use tb_core::config::ApiConfig;
use tb_core::error::{BotError, BotResult};

use crate::client::ApiClient;
use crate::request::ApiRequest;
use crate::transport::{Transport, TransportResponse};

/// Base URL used by [`scripted_client`].
pub const TEST_BASE_URL: &str = "http://bot.test/bot/v1";

/// Token used by [`scripted_client`].
pub const TEST_TOKEN: &str = "001.0000000000.0000000000:test";

#[derive(Debug, Clone)]
enum Reply {
    Body { status: u16, body: String },
    Fail(String),
    Stall,
}

#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<ApiRequest>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a 200 response with the given JSON body.
    pub fn push_json(&self, body: Value) -> &Self {
        self.push_body(200, body.to_string())
    }

    /// Queue a response with an arbitrary status and body.
    pub fn push_body(&self, status: u16, body: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Reply::Body {
            status,
            body: body.into(),
        });
        self
    }

    /// Queue a transport failure.
    pub fn push_failure(&self, message: impl Into<String>) -> &Self {
        lock(&self.replies).push_back(Reply::Fail(message.into()));
        self
    }

    /// Queue a request that never completes.
    pub fn push_stall(&self) -> &Self {
        lock(&self.replies).push_back(Reply::Stall);
        self
    }

    /// Queue a successful `/events/get` response carrying `newMessage`
    /// events with the given ids.
    pub fn push_events(&self, ids: &[i64]) -> &Self {
        self.push_json(events_body(ids))
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        lock(&self.requests).clone()
    }

    pub fn request_count(&self) -> usize {
        lock(&self.requests).len()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.replies).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn execute(&self, request: ApiRequest) -> BotResult<TransportResponse> {
        lock(&self.requests).push(request);
        let reply = lock(&self.replies).pop_front();
        match reply {
            Some(Reply::Body { status, body }) => Ok(TransportResponse {
                status,
                body: body.into_bytes(),
            }),
            Some(Reply::Fail(message)) => Err(BotError::Transport(message)),
            Some(Reply::Stall) | None => std::future::pending().await,
        }
    }
}

/// An `/events/get` body with one `newMessage` event per id.
pub fn events_body(ids: &[i64]) -> Value {
    let events: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "eventId": id,
                "type": "newMessage",
                "payload": {
                    "msgId": format!("msg-{id}"),
                    "chat": { "chatId": "test@chat.agent", "type": "group" },
                    "from": { "userId": "1000" },
                    "text": format!("event {id}"),
                    "timestamp": 1_546_290_000 + id
                }
            })
        })
        .collect();
    json!({ "ok": true, "events": events })
}

/// A client wired to `transport` with the test base URL and token.
pub fn scripted_client(transport: Arc<ScriptedTransport>) -> ApiClient {
    let config = ApiConfig {
        base_url: TEST_BASE_URL.to_string(),
        ..ApiConfig::with_token(TEST_TOKEN)
    };
    match ApiClient::with_transport(&config, transport) {
        Ok(client) => client,
        Err(e) => panic!("test client config rejected: {e}"),
    }
}
