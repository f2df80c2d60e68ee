//! Long-poll event updater.
//!
//! Repeatedly calls `/events/get`, keeps a monotonic cursor of the highest
//! event id fetched, and republishes retrieved events in order on a bounded
//! channel. Events not yet handed to a consumer stay queued in the updater.
//! Failures never end the loop: each one is logged, reported to the optional
//! error hook, and followed by a fixed pause before the same cursor is polled
//! again. Only cancellation or a dropped consumer stops it.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use tb_api::ApiClient;
use tb_core::config::PollerConfig;
use tb_core::error::{BotError, BotResult};
use tb_models::Event;

use crate::stream::EventStream;

/// Callback invoked with every poll failure.
pub type ErrorHook = Arc<dyn Fn(&BotError) + Send + Sync>;

/// Lifecycle of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Created, not started.
    Idle,
    /// A long-poll request is in flight or events are being handed off.
    Polling,
    /// Waiting out the retry delay after a failure.
    Backoff,
    /// Cancelled or abandoned by the consumer; nothing more is emitted.
    Stopped,
}

impl std::fmt::Display for PollerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Polling => write!(f, "polling"),
            Self::Backoff => write!(f, "backoff"),
            Self::Stopped => write!(f, "stopped"),
        }
    }
}

/// Event poller bound to one client.
///
/// The updater is the only writer of its cursor. Calling [`Updater::spawn`]
/// moves it into a background task, which hands it back through
/// [`EventStream::stop`] so polling can resume where delivery left off.
pub struct Updater {
    client: ApiClient,
    /// Highest event id fetched so far. Never decreases.
    cursor: i64,
    /// Fetched events not yet handed to a consumer, in server order.
    undelivered: VecDeque<Event>,
    /// Set once the backlog has been skipped, so a resumed run does not skip again.
    primed: bool,
    poll_time: Duration,
    retry_delay: Duration,
    skip_backlog: bool,
    on_error: Option<ErrorHook>,
    state_tx: watch::Sender<PollerState>,
}

impl Updater {
    pub fn new(client: ApiClient, config: &PollerConfig) -> Self {
        let (state_tx, _) = watch::channel(PollerState::Idle);
        Self {
            client,
            cursor: 0,
            undelivered: VecDeque::new(),
            primed: false,
            poll_time: config.poll_time(),
            retry_delay: config.retry_delay(),
            skip_backlog: config.skip_backlog,
            on_error: None,
            state_tx,
        }
    }

    /// Start from a known cursor instead of 0.
    pub fn with_cursor(mut self, cursor: i64) -> Self {
        self.cursor = cursor.max(0);
        self
    }

    /// Register a callback that observes every poll failure.
    pub fn with_error_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&BotError) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(hook));
        self
    }

    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Events fetched by a stopped run that no consumer has received yet.
    /// A resumed run delivers them before polling again.
    pub fn undelivered(&self) -> usize {
        self.undelivered.len()
    }

    /// Put events back at the front of the delivery queue, keeping their order.
    pub(crate) fn requeue(&mut self, events: Vec<Event>) {
        for event in events.into_iter().rev() {
            self.undelivered.push_front(event);
        }
    }

    pub fn poll_time(&self) -> Duration {
        self.poll_time
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    pub fn state(&self) -> PollerState {
        *self.state_tx.borrow()
    }

    /// Subscribe to state changes.
    pub fn state_receiver(&self) -> watch::Receiver<PollerState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, new_state: PollerState) {
        self.state_tx.send_if_modified(|state| {
            if *state == new_state {
                return false;
            }
            info!("poller state: {} -> {}", *state, new_state);
            *state = new_state;
            true
        });
    }

    /// Perform one long poll from the current cursor.
    ///
    /// On success the cursor moves to the highest event id in the batch (an
    /// empty batch leaves it alone) and the batch is returned in server
    /// order. On failure the cursor is untouched, so the next call asks for
    /// the same events again.
    pub async fn get_next_batch(&mut self, cancel: &CancellationToken) -> BotResult<Vec<Event>> {
        let events = self
            .client
            .get_events(cancel, self.cursor, self.poll_time)
            .await?;
        self.advance(&events);
        Ok(events)
    }

    fn advance(&mut self, events: &[Event]) {
        if let Some(max) = events.iter().map(|e| e.event_id).max() {
            self.cursor = self.cursor.max(max);
        }
    }

    /// Move the cursor past whatever the server is holding right now.
    ///
    /// Failure is not fatal: polling then starts from the current cursor.
    async fn skip_pending(&mut self, cancel: &CancellationToken) {
        match self.client.get_events(cancel, self.cursor, Duration::ZERO).await {
            Ok(events) => {
                self.advance(&events);
                info!(
                    "skipped {} pending event(s), starting after {}",
                    events.len(),
                    self.cursor
                );
            }
            Err(e) => warn!("failed to skip pending events: {e}"),
        }
    }

    fn report(&self, error: &BotError) {
        warn!(
            "event poll failed (cursor {}), retrying in {:.1}s: {error}",
            self.cursor,
            self.retry_delay.as_secs_f64()
        );
        if let Some(hook) = &self.on_error {
            hook(error);
        }
    }

    /// Start polling in a background task.
    ///
    /// The returned stream yields events until `cancel` fires. Dropping the
    /// stream also stops the task at its next suspension point.
    pub fn spawn(self, cancel: CancellationToken) -> EventStream {
        let (tx, rx) = mpsc::channel(1);
        let state = self.state_receiver();
        let task = tokio::spawn(self.run(cancel, tx));
        EventStream::new(rx, state, task)
    }

    async fn run(mut self, cancel: CancellationToken, tx: mpsc::Sender<Event>) -> Self {
        info!("event poller starting at cursor {}", self.cursor);
        self.set_state(PollerState::Polling);

        if self.skip_backlog && !self.primed && !cancel.is_cancelled() {
            self.skip_pending(&cancel).await;
            self.primed = true;
        }

        'poll: loop {
            // An event leaves the queue only once the channel has room for it.
            while !self.undelivered.is_empty() {
                let permit = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break 'poll,
                    permit = tx.reserve() => match permit {
                        Ok(permit) => permit,
                        Err(_) => break 'poll,
                    },
                };
                if let Some(event) = self.undelivered.pop_front() {
                    permit.send(event);
                }
            }

            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break 'poll,
                _ = tx.closed() => break 'poll,
                result = self.get_next_batch(&cancel) => result,
            };

            match result {
                Ok(events) => {
                    debug!("received {} event(s), cursor {}", events.len(), self.cursor);
                    self.undelivered.extend(events);
                }
                Err(_) if cancel.is_cancelled() => break 'poll,
                Err(e) => {
                    self.report(&e);
                    self.set_state(PollerState::Backoff);
                    tokio::select! {
                        biased;
                        _ = cancel.cancelled() => break 'poll,
                        _ = tx.closed() => break 'poll,
                        _ = sleep(self.retry_delay) => {}
                    }
                    self.set_state(PollerState::Polling);
                }
            }
        }

        self.set_state(PollerState::Stopped);
        info!(
            "event poller stopped at cursor {} with {} undelivered event(s)",
            self.cursor,
            self.undelivered.len()
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures::StreamExt;
    use serde_json::json;
    use tb_api::testing::{scripted_client, ScriptedTransport};

    fn updater(transport: Arc<ScriptedTransport>) -> Updater {
        Updater::new(scripted_client(transport), &PollerConfig::default())
    }

    fn sent_cursors(transport: &ScriptedTransport) -> Vec<String> {
        transport
            .requests()
            .iter()
            .map(|r| r.params.get("lastEventId").unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_cursor_is_monotonic() {
        let transport = ScriptedTransport::new();
        transport
            .push_events(&[5, 3])
            .push_events(&[])
            .push_events(&[4])
            .push_events(&[7]);
        let mut updater = updater(transport.clone());
        let cancel = CancellationToken::new();

        let batch = updater.get_next_batch(&cancel).await.unwrap();
        assert_eq!(batch.iter().map(|e| e.event_id).collect::<Vec<_>>(), [5, 3]);
        assert_eq!(updater.cursor(), 5);

        assert!(updater.get_next_batch(&cancel).await.unwrap().is_empty());
        assert_eq!(updater.cursor(), 5);

        updater.get_next_batch(&cancel).await.unwrap();
        assert_eq!(updater.cursor(), 5);

        updater.get_next_batch(&cancel).await.unwrap();
        assert_eq!(updater.cursor(), 7);

        assert_eq!(sent_cursors(&transport), ["0", "5", "5", "5"]);
    }

    #[tokio::test]
    async fn test_failed_batch_keeps_cursor() {
        let transport = ScriptedTransport::new();
        transport
            .push_events(&[10])
            .push_json(json!({ "ok": false, "description": "Invalid token" }))
            .push_failure("connection reset");
        let mut updater = updater(transport.clone()).with_cursor(9);
        let cancel = CancellationToken::new();

        updater.get_next_batch(&cancel).await.unwrap();
        assert!(matches!(
            updater.get_next_batch(&cancel).await,
            Err(BotError::Api { .. })
        ));
        assert!(updater.get_next_batch(&cancel).await.unwrap_err().is_transport());
        assert_eq!(updater.cursor(), 10);
        assert_eq!(sent_cursors(&transport), ["9", "10", "10"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_survives_failure_without_gap() {
        let transport = ScriptedTransport::new();
        transport
            .push_events(&[1, 2])
            .push_failure("connection refused")
            .push_events(&[3]);
        let errors = Arc::new(AtomicUsize::new(0));
        let seen = errors.clone();
        let updater = updater(transport.clone()).with_error_hook(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let cancel = CancellationToken::new();
        let mut stream = updater.spawn(cancel.clone());

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(stream.next().await.unwrap().event_id);
        }
        assert_eq!(ids, [1, 2, 3]);
        assert_eq!(errors.load(Ordering::SeqCst), 1);

        cancel.cancel();
        let updater = stream.stop().await.unwrap();
        assert_eq!(updater.cursor(), 3);
        assert_eq!(updater.state(), PollerState::Stopped);
        assert_eq!(&sent_cursors(&transport)[..3], ["0", "2", "2"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_after_stop_delivers_rest_of_batch() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[1, 2, 3]).push_events(&[4]);

        let cancel = CancellationToken::new();
        let mut stream = updater(transport.clone()).spawn(cancel.clone());
        assert_eq!(stream.next().await.unwrap().event_id, 1);
        tokio::task::yield_now().await;

        cancel.cancel();
        let updater = stream.stop().await.unwrap();
        assert_eq!(updater.cursor(), 3);
        assert_eq!(updater.undelivered(), 2);

        let cancel = CancellationToken::new();
        let mut stream = updater.spawn(cancel.clone());
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(stream.next().await.unwrap().event_id);
        }
        assert_eq!(ids, [2, 3, 4]);
        cancel.cancel();

        assert_eq!(sent_cursors(&transport)[..2], ["0", "3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_does_not_skip_backlog_again() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[1]).push_events(&[2]).push_events(&[3]);
        let config = PollerConfig {
            skip_backlog: true,
            ..PollerConfig::default()
        };
        let cancel = CancellationToken::new();
        let mut stream =
            Updater::new(scripted_client(transport.clone()), &config).spawn(cancel.clone());
        assert_eq!(stream.next().await.unwrap().event_id, 2);

        cancel.cancel();
        let updater = stream.stop().await.unwrap();
        let cancel = CancellationToken::new();
        let mut stream = updater.spawn(cancel.clone());
        assert_eq!(stream.next().await.unwrap().event_id, 3);
        cancel.cancel();

        let priming = transport
            .requests()
            .iter()
            .filter(|r| r.params.get("pollTime") == Some("0"))
            .count();
        assert_eq!(priming, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_backoff_closes_stream() {
        let transport = ScriptedTransport::new();
        transport.push_failure("connection refused");
        let updater = updater(transport.clone());
        let retry_delay = updater.retry_delay();
        let mut state = updater.state_receiver();

        let cancel = CancellationToken::new();
        let mut stream = updater.spawn(cancel.clone());
        state
            .wait_for(|s| *s == PollerState::Backoff)
            .await
            .unwrap();

        cancel.cancel();
        let closed = tokio::time::timeout(retry_delay, stream.next()).await;
        assert!(matches!(closed, Ok(None)));
        assert_eq!(transport.request_count(), 1);
        assert_eq!(stream.state(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_long_poll() {
        let transport = ScriptedTransport::new();
        transport.push_stall();
        let cancel = CancellationToken::new();
        let mut stream = updater(transport.clone()).spawn(cancel.clone());

        tokio::task::yield_now().await;
        cancel.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_stream_stops_poller() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[1, 2, 3]);
        let stream = updater(transport.clone()).spawn(CancellationToken::new());
        let mut state = stream.state_receiver();

        drop(stream);
        let _ = state.wait_for(|s| *s == PollerState::Stopped).await;
        assert_eq!(*state.borrow(), PollerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_backlog_starts_from_now() {
        let transport = ScriptedTransport::new();
        transport.push_events(&[1, 2]).push_events(&[3]);
        let config = PollerConfig {
            skip_backlog: true,
            ..PollerConfig::default()
        };
        let updater = Updater::new(scripted_client(transport.clone()), &config);
        let cancel = CancellationToken::new();
        let mut stream = updater.spawn(cancel.clone());

        assert_eq!(stream.next().await.unwrap().event_id, 3);
        cancel.cancel();
        stream.stop().await;

        let requests = transport.requests();
        assert_eq!(requests[0].params.get("pollTime"), Some("0"));
        assert_eq!(requests[1].params.get("lastEventId"), Some("2"));
        assert_eq!(requests[1].params.get("pollTime"), Some("60"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_backlog_failure_is_ignored() {
        let transport = ScriptedTransport::new();
        transport.push_failure("boom").push_events(&[1]);
        let config = PollerConfig {
            skip_backlog: true,
            ..PollerConfig::default()
        };
        let cancel = CancellationToken::new();
        let mut stream =
            Updater::new(scripted_client(transport.clone()), &config).spawn(cancel.clone());

        assert_eq!(stream.next().await.unwrap().event_id, 1);
        cancel.cancel();
        assert_eq!(sent_cursors(&transport)[1], "0");
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PollerState::Backoff.to_string(), "backoff");
        assert_eq!(PollerState::Stopped.to_string(), "stopped");
    }
}
