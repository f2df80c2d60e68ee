//! HTTP transport seam.
//!
//! The dispatcher builds an [`ApiRequest`] and hands it to a [`Transport`],
//! which performs exactly one round trip and returns the status and full body.
//! The default transport is reqwest; tests substitute a scripted one.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;

use tb_core::config::ApiConfig;
use tb_core::constants::FILE_FIELD;
use tb_core::error::{BotError, BotResult};
use tb_core::Platform;

use crate::request::ApiRequest;

/// Status and body of a completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Executes prepared requests. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> BotResult<TransportResponse>;
}

/// Transport backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
}

impl ReqwestTransport {
    /// Build a client honoring the TLS setting of the API config.
    ///
    /// Per-request timeouts come from each [`ApiRequest`], so long polls and
    /// ordinary calls share one connection pool.
    pub fn new(config: &ApiConfig) -> BotResult<Self> {
        let mut builder = Client::builder()
            .user_agent(Platform::user_agent())
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(30));

        if config.accept_invalid_certs {
            builder = builder.danger_accept_invalid_certs(true);
        }

        let inner = builder
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { inner })
    }

    /// Wrap an already configured reqwest client.
    pub fn from_client(inner: Client) -> Self {
        Self { inner }
    }

    fn multipart(request: &mut ApiRequest) -> Option<Form> {
        let file = request.file.take()?;
        let mut form = Form::new();
        for (key, value) in request.params.pairs() {
            form = form.text(key.to_string(), value.to_string());
        }
        let (name, bytes) = file.into_parts();
        Some(form.part(FILE_FIELD, Part::bytes(bytes).file_name(name)))
    }

    /// Classify a reqwest error into a BotError variant.
    fn classify_error(e: reqwest::Error) -> BotError {
        if e.is_timeout() {
            BotError::Timeout(e.to_string())
        } else if e.is_connect() {
            BotError::Transport(format!("connection failed: {e}"))
        } else {
            BotError::Transport(e.to_string())
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, mut request: ApiRequest) -> BotResult<TransportResponse> {
        let form = Self::multipart(&mut request);
        let builder = self.inner.request(request.method.clone(), &request.url);
        let builder = match form {
            Some(form) => builder.multipart(form),
            None => builder.query(&request.params.pairs()),
        };

        let response = builder
            .timeout(request.timeout)
            .send()
            .await
            .map_err(Self::classify_error)?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(Self::classify_error)?;

        Ok(TransportResponse {
            status,
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Params;
    use reqwest::Method;
    use tb_models::FileUpload;

    fn upload_request() -> ApiRequest {
        ApiRequest {
            method: Method::POST,
            url: "http://localhost/messages/sendFile".into(),
            params: Params::new().with("chatId", "c").with("token", "t"),
            file: Some(FileUpload::from_bytes("a.txt", b"hi".to_vec())),
            timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_multipart_takes_file() {
        let mut request = upload_request();
        let form = ReqwestTransport::multipart(&mut request);
        assert!(form.is_some());
        assert!(request.file.is_none());
        assert!(!form.unwrap().boundary().is_empty());
    }

    #[test]
    fn test_no_file_means_no_form() {
        let mut request = upload_request();
        request.file = None;
        assert!(ReqwestTransport::multipart(&mut request).is_none());
    }

    #[test]
    fn test_build_transport() {
        let config = ApiConfig {
            accept_invalid_certs: true,
            ..ApiConfig::default()
        };
        assert!(ReqwestTransport::new(&config).is_ok());
    }

    #[test]
    fn test_response_success_range() {
        let ok = TransportResponse { status: 204, body: vec![] };
        let bad = TransportResponse { status: 502, body: vec![] };
        assert!(ok.is_success());
        assert!(!bad.is_success());
    }
}
