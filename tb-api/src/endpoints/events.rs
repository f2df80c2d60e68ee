//! Event retrieval endpoint.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use tb_core::constants::POLL_TIMEOUT_SLACK;
use tb_core::error::BotResult;
use tb_models::Event;

use crate::client::ApiClient;
use crate::request::Params;
use crate::response::EventsBatch;

impl ApiClient {
    /// Long-poll for events newer than `last_event_id`.
    ///
    /// The server holds the request open for up to `poll_time` and answers
    /// as soon as events exist. The request itself times out `poll_time`
    /// plus a fixed slack later. `last_event_id` 0 asks for everything the
    /// server still retains.
    pub async fn get_events(
        &self,
        cancel: &CancellationToken,
        last_event_id: i64,
        poll_time: Duration,
    ) -> BotResult<Vec<Event>> {
        let params = Params::new()
            .with("lastEventId", last_event_id.to_string())
            .with("pollTime", poll_time.as_secs().to_string());

        let raw = self
            .send_cancellable(cancel, "/events/get", params, None, poll_time + POLL_TIMEOUT_SLACK)
            .await?;
        let batch: EventsBatch = raw.decode()?;
        Ok(batch.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{scripted_client, ScriptedTransport};
    use serde_json::json;
    use tb_core::error::BotError;

    #[tokio::test]
    async fn test_get_events_params_and_order() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[4, 5]);
        let client = scripted_client(transport.clone());

        let events = client
            .get_events(&CancellationToken::new(), 3, Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(events.iter().map(|e| e.event_id).collect::<Vec<_>>(), [4, 5]);

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://bot.test/bot/v1/events/get");
        assert_eq!(request.params.get("lastEventId"), Some("3"));
        assert_eq!(request.params.get("pollTime"), Some("60"));
        assert_eq!(request.timeout, Duration::from_secs(70));
    }

    #[tokio::test]
    async fn test_malformed_batch_is_decode_error() {
        let transport = ScriptedTransport::new();
        transport.push_json(json!({ "ok": true, "events": [{ "type": "newMessage" }] }));
        let client = scripted_client(transport);

        let err = client
            .get_events(&CancellationToken::new(), 0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_already_cancelled_does_not_send() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[1]);
        let client = scripted_client(transport.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client
            .get_events(&cancel, 0, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, BotError::Cancelled));
        assert_eq!(transport.request_count(), 0);
    }
}
