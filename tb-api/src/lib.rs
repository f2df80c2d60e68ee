//! teambot API - HTTP client for the bot API.
//!
//! This crate provides the request dispatcher every operation goes through:
//! it injects the bot token, sends plain calls as GET with a query string and
//! file uploads as multipart POST, and validates the `{ok, description}`
//! envelope of every response. Typed endpoint methods for messages, chats,
//! files, the bot itself, and event retrieval are layered on top.

pub mod client;
pub mod endpoints;
pub mod request;
pub mod response;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types
pub use client::ApiClient;
pub use endpoints::chats::PendingTarget;
pub use endpoints::messages::SendRoute;
pub use request::{ApiRequest, Params};
pub use response::{Envelope, RawResponse};
pub use transport::{ReqwestTransport, Transport, TransportResponse};
