//! Request dispatcher for the bot API.
//!
//! Every call goes through [`ApiClient::dispatch`]: the token is injected,
//! plain calls become a GET with a query string, calls with a file become a
//! multipart POST, and the body is validated against the response envelope.
//! The dispatcher performs exactly one round trip per call and never retries.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use tb_core::config::{ApiConfig, BotConfig};
use tb_core::constants::TOKEN_PARAM;
use tb_core::error::{BotError, BotResult};
use tb_models::FileUpload;

use crate::request::{ApiRequest, Params};
use crate::response::{self, RawResponse};
use crate::transport::{ReqwestTransport, Transport};

/// HTTP client for the bot API.
///
/// Holds only immutable data and a shared transport, so clones are cheap and
/// may be used concurrently from any number of tasks.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    /// Base URL without a trailing slash (e.g. "https://api.icq.net/bot/v1").
    base_url: String,
    token: String,
    /// Timeout for ordinary calls. Event polls compute their own.
    timeout: Duration,
}

impl ApiClient {
    /// Create a client using the default reqwest transport.
    pub fn new(config: &ApiConfig) -> BotResult<Self> {
        let transport = ReqwestTransport::new(config)?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create a client on top of a custom transport.
    pub fn with_transport(config: &ApiConfig, transport: Arc<dyn Transport>) -> BotResult<Self> {
        if config.token.is_empty() {
            return Err(BotError::MissingConfig("api.token".into()));
        }
        let base_url = BotConfig::sanitize_base_url(&config.base_url);
        if base_url.is_empty() {
            return Err(BotError::MissingConfig("api.base_url".into()));
        }

        Ok(Self {
            transport,
            base_url,
            token: config.token.clone(),
            timeout: config.request_timeout(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one authenticated request and validate the response envelope.
    ///
    /// `path` is relative to the base URL and must start with `/`. Any
    /// caller-supplied `token` parameter is overwritten.
    pub async fn dispatch(
        &self,
        path: &str,
        params: Params,
        file: Option<FileUpload>,
    ) -> BotResult<RawResponse> {
        self.send(path, params, file, self.timeout).await
    }

    /// Like [`ApiClient::dispatch`], failing with `Cancelled` as soon as
    /// `cancel` fires. The in-flight request is dropped.
    pub async fn dispatch_with_cancel(
        &self,
        cancel: &CancellationToken,
        path: &str,
        params: Params,
        file: Option<FileUpload>,
    ) -> BotResult<RawResponse> {
        self.send_cancellable(cancel, path, params, file, self.timeout)
            .await
    }

    pub(crate) async fn send_cancellable(
        &self,
        cancel: &CancellationToken,
        path: &str,
        params: Params,
        file: Option<FileUpload>,
        timeout: Duration,
    ) -> BotResult<RawResponse> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("request to {} cancelled", path);
                Err(BotError::Cancelled)
            }
            result = self.send(path, params, file, timeout) => result,
        }
    }

    pub(crate) async fn send(
        &self,
        path: &str,
        params: Params,
        file: Option<FileUpload>,
        timeout: Duration,
    ) -> BotResult<RawResponse> {
        let request = self.prepare(path, params, file, timeout)?;
        debug!("requesting api: {} {}", request.method, request.redacted_url());

        let response = match tokio::time::timeout(timeout, self.transport.execute(request)).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!("request to {} failed: {}", path, e);
                return Err(e);
            }
            Err(_) => {
                error!("request to {} timed out after {:?}", path, timeout);
                return Err(BotError::Timeout(format!(
                    "{path}: no response within {timeout:?}"
                )));
            }
        };

        debug!(
            "got response from API: {} {} {}",
            path,
            response.status,
            String::from_utf8_lossy(&response.body)
        );

        let status = response.status;
        let success = response.is_success();
        response::validate(path, response.body).map_err(|e| match e {
            BotError::Decode { context, message } if !success => BotError::Decode {
                context,
                message: format!("HTTP {status}: {message}"),
            },
            other => other,
        })
    }

    fn prepare(
        &self,
        path: &str,
        mut params: Params,
        file: Option<FileUpload>,
        timeout: Duration,
    ) -> BotResult<ApiRequest> {
        if !path.starts_with('/') {
            return Err(BotError::Usage(format!(
                "endpoint path must start with '/': {path:?}"
            )));
        }

        params.set(TOKEN_PARAM, self.token.as_str());
        let method = if file.is_some() {
            Method::POST
        } else {
            Method::GET
        };

        Ok(ApiRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            params,
            file,
            timeout,
        })
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scripted_client, ScriptedTransport, TEST_TOKEN};
    use serde_json::json;

    #[tokio::test]
    async fn test_token_overrides_caller_value() {
        let transport = ScriptedTransport::new();
        transport.push_json(json!({ "ok": true }));
        let client = scripted_client(transport.clone());

        let params = Params::new().with("token", "forged").with("chatId", "c");
        client.dispatch("/chats/getInfo", params, None).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.params.get_all("token"), [TEST_TOKEN.to_string()]);
        assert_eq!(request.params.get("chatId"), Some("c"));
    }

    #[tokio::test]
    async fn test_plain_call_is_get_and_file_call_is_post() {
        let transport = ScriptedTransport::new();
        transport
            .push_json(json!({ "ok": true }))
            .push_json(json!({ "ok": true, "msgId": "1" }));
        let client = scripted_client(transport.clone());

        client.dispatch("/self/get", Params::new(), None).await.unwrap();
        let upload = FileUpload::from_bytes("doc.pdf", b"%PDF".to_vec());
        client
            .dispatch("/messages/sendFile", Params::new().with("chatId", "c"), Some(upload))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests[0].method, Method::GET);
        assert_eq!(requests[0].url, "http://bot.test/bot/v1/self/get");
        assert!(requests[0].file.is_none());
        assert_eq!(requests[1].method, Method::POST);
        assert_eq!(requests[1].file.as_ref().unwrap().name(), "doc.pdf");
    }

    #[tokio::test]
    async fn test_bad_path_is_rejected_before_sending() {
        let transport = ScriptedTransport::new();
        let client = scripted_client(transport.clone());

        for path in ["", "self/get"] {
            let err = client.dispatch(path, Params::new(), None).await.unwrap_err();
            assert!(matches!(err, BotError::Usage(_)));
        }
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_api_error_keeps_literal_body() {
        let body = r#"{"ok": false, "description": "Chat not found"}"#;
        let transport = ScriptedTransport::new();
        transport.push_body(200, body);
        let client = scripted_client(transport);

        let err = client
            .dispatch("/chats/getInfo", Params::new(), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Chat not found"));
        assert_eq!(err.raw_body(), Some(body.as_bytes()));
    }

    #[tokio::test]
    async fn test_non_json_error_page_names_status() {
        let transport = ScriptedTransport::new();
        transport.push_body(502, "<html>Bad Gateway</html>");
        let client = scripted_client(transport);

        let err = client.dispatch("/self/get", Params::new(), None).await.unwrap_err();
        match err {
            BotError::Decode { context, message } => {
                assert_eq!(context, "/self/get");
                assert!(message.starts_with("HTTP 502"));
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let transport = ScriptedTransport::new();
        transport
            .push_failure("connection refused")
            .push_json(json!({ "ok": true }));
        let client = scripted_client(transport.clone());

        let err = client.dispatch("/self/get", Params::new(), None).await.unwrap_err();
        assert!(err.is_transport());
        assert_eq!(transport.request_count(), 1);
        assert_eq!(transport.remaining(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_request_times_out() {
        let transport = ScriptedTransport::new();
        transport.push_stall();
        let client = scripted_client(transport);

        let err = client.dispatch("/self/get", Params::new(), None).await.unwrap_err();
        assert!(matches!(err, BotError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_cancel_aborts_in_flight_request() {
        let transport = ScriptedTransport::new();
        transport.push_stall();
        let client = scripted_client(transport.clone());
        let cancel = CancellationToken::new();

        let call = {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                client
                    .dispatch_with_cancel(&cancel, "/events/get", Params::new(), None)
                    .await
            })
        };
        while transport.request_count() == 0 {
            tokio::task::yield_now().await;
        }
        cancel.cancel();

        let err = call.await.unwrap().unwrap_err();
        assert!(matches!(err, BotError::Cancelled));
        assert!(err.is_transport());
    }

    #[test]
    fn test_construction_requires_token_and_sanitizes_url() {
        let transport = ScriptedTransport::new();
        let missing = ApiClient::with_transport(&ApiConfig::default(), transport.clone());
        assert!(matches!(missing, Err(BotError::MissingConfig(_))));

        let config = ApiConfig {
            base_url: "http://localhost:8080/bot/v1/".into(),
            ..ApiConfig::with_token("t")
        };
        let client = ApiClient::with_transport(&config, transport).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/bot/v1");
        assert!(!format!("{client:?}").contains("\"t\""));
    }
}
