//! Response envelope validation and typed response shapes.
//!
//! Every bot API response is a JSON object with a top-level `ok` flag and,
//! on failure, a `description`:
//! ```json
//! { "ok": false, "description": "Missing required parameter 'chatId'" }
//! ```
//! Endpoint-specific fields sit next to `ok` in the same object, so a
//! validated body is decoded a second time into the endpoint's shape.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use tb_core::error::{BotError, BotResult};
use tb_models::{ChatMember, Event, User};

/// The `{ok, description}` wrapper common to all responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Envelope {
    pub fn parse(body: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(body)
    }
}

/// A body that passed envelope validation, kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    path: String,
    body: Vec<u8>,
}

impl RawResponse {
    /// Endpoint path the body came from.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn into_body(self) -> Vec<u8> {
        self.body
    }

    /// Decode the body into the endpoint's typed shape.
    pub fn decode<T: DeserializeOwned>(&self) -> BotResult<T> {
        serde_json::from_slice(&self.body).map_err(|e| BotError::decode(&self.path, e))
    }
}

/// Validate a raw body against the envelope.
///
/// Fails with `Decode` when the body is not an envelope, and with `Api`
/// carrying the description and the untouched body when `ok` is false.
pub fn validate(path: &str, body: Vec<u8>) -> BotResult<RawResponse> {
    let envelope = Envelope::parse(&body).map_err(|e| BotError::decode(path, e))?;
    if !envelope.ok {
        return Err(BotError::Api {
            path: path.to_string(),
            description: envelope
                .description
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "no description".to_string()),
            body,
        });
    }
    Ok(RawResponse {
        path: path.to_string(),
        body,
    })
}

/// `/chats/getBlockedUsers` and `/chats/getPendingUsers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsersList {
    #[serde(default)]
    pub users: Vec<User>,
}

/// `/chats/getMembers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MembersList {
    #[serde(default)]
    pub members: Vec<ChatMember>,
    /// Continuation cursor for large chats.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// `/chats/getAdmins`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminsList {
    #[serde(default)]
    pub admins: Vec<ChatMember>,
}

/// `/events/get`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventsBatch {
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Echo of a sent message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentMessage {
    #[serde(default)]
    pub msg_id: String,
    /// Present when a file was uploaded.
    #[serde(default)]
    pub file_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_body_is_kept_for_typed_decode() {
        let body = br#"{"ok":true,"msgId":"57883346846815032"}"#.to_vec();
        let raw = validate("/messages/sendText", body.clone()).unwrap();
        assert_eq!(raw.body(), &body[..]);
        let sent: SentMessage = raw.decode().unwrap();
        assert_eq!(sent.msg_id, "57883346846815032");
    }

    #[test]
    fn test_not_ok_carries_description_and_body() {
        let body = br#"{"ok":false,"description":"Invalid token"}"#.to_vec();
        let err = validate("/self/get", body.clone()).unwrap_err();
        assert!(err.to_string().contains("Invalid token"));
        assert_eq!(err.raw_body(), Some(&body[..]));
    }

    #[test]
    fn test_not_ok_without_description() {
        let err = validate("/self/get", br#"{"ok":false}"#.to_vec()).unwrap_err();
        assert_eq!(err.description(), Some("no description"));
    }

    #[test]
    fn test_non_envelope_is_decode_error() {
        let bodies: [&[u8]; 3] = [b"<html>502</html>", br#"{"status":200}"#, b""];
        for body in bodies {
            let err = validate("/events/get", body.to_vec()).unwrap_err();
            match err {
                BotError::Decode { context, .. } => assert_eq!(context, "/events/get"),
                other => panic!("expected decode error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_typed_decode_failure_names_path() {
        let raw = validate("/chats/getMembers", br#"{"ok":true,"members":"nope"}"#.to_vec()).unwrap();
        let err = raw.decode::<MembersList>().unwrap_err();
        assert!(err.to_string().starts_with("/chats/getMembers: cannot decode response"));
    }

    #[test]
    fn test_list_shapes() {
        let raw = validate(
            "/chats/getAdmins",
            br#"{"ok":true,"admins":[{"userId":"1","creator":true}]}"#.to_vec(),
        )
        .unwrap();
        let admins: AdminsList = raw.decode().unwrap();
        assert!(admins.admins[0].creator);

        let raw = validate("/events/get", br#"{"ok":true}"#.to_vec()).unwrap();
        let batch: EventsBatch = raw.decode().unwrap();
        assert!(batch.events.is_empty());
    }
}
