//! teambot updates - long-poll event delivery.
//!
//! This crate provides the [`Updater`], a background poller over
//! `/events/get` that:
//! - keeps a monotonic cursor of the last event id seen
//! - retries failed polls after a fixed delay with the same cursor
//! - can skip the backlog that was pending before it started
//! - publishes events on a single-slot channel exposed as [`EventStream`]
//! - stops when its cancellation token fires or the stream is dropped

pub mod stream;
pub mod updater;

// Re-export key types
pub use stream::EventStream;
pub use updater::{ErrorHook, PollerState, Updater};
