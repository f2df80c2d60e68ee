//! Consumer side of a running [`Updater`].

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::error;

use tb_models::Event;

use crate::updater::{PollerState, Updater};

/// Events from a background poller, in server order.
///
/// The stream ends after the poller stops. Dropping it makes the poller
/// stop as well.
pub struct EventStream {
    rx: mpsc::Receiver<Event>,
    state: watch::Receiver<PollerState>,
    task: JoinHandle<Updater>,
}

impl EventStream {
    pub(crate) fn new(
        rx: mpsc::Receiver<Event>,
        state: watch::Receiver<PollerState>,
        task: JoinHandle<Updater>,
    ) -> Self {
        Self { rx, state, task }
    }

    /// Wait for the next event. `None` once the poller has stopped.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn state(&self) -> PollerState {
        *self.state.borrow()
    }

    pub fn state_receiver(&self) -> watch::Receiver<PollerState> {
        self.state.clone()
    }

    /// Stop consuming and wait for the poller to wind down.
    ///
    /// Returns the updater with its final cursor, or `None` if the poller
    /// task panicked. Events fetched but not yet received stay queued in the
    /// updater and are delivered first when it is spawned again.
    pub async fn stop(self) -> Option<Updater> {
        let Self { mut rx, task, .. } = self;
        rx.close();
        match task.await {
            Ok(mut updater) => {
                let mut buffered = Vec::new();
                while let Ok(event) = rx.try_recv() {
                    buffered.push(event);
                }
                updater.requeue(buffered);
                Some(updater)
            }
            Err(e) => {
                error!("event poller task failed: {e}");
                None
            }
        }
    }
}

impl Stream for EventStream {
    type Item = Event;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Event>> {
        self.rx.poll_recv(cx)
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
