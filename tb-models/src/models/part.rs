//! Message parts: stickers, mentions, voice notes, files, forwards, replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::user::Contact;

/// A message quoted inside a `forward` or `reply` part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotedMessage {
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub from: Contact,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    #[serde(default)]
    pub file_id: String,
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(default)]
    pub caption: String,
}

/// One structured element of an incoming message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPart", into = "RawPart")]
pub enum Part {
    Sticker { file_id: String },
    Mention(Contact),
    Voice { file_id: String },
    File(FilePart),
    Forward(QuotedMessage),
    Reply(QuotedMessage),
    /// A part type this library does not model, or one whose payload did not decode.
    Unknown { kind: String, payload: Value },
}

impl Part {
    pub fn type_name(&self) -> &str {
        match self {
            Part::Sticker { .. } => "sticker",
            Part::Mention(_) => "mention",
            Part::Voice { .. } => "voice",
            Part::File(_) => "file",
            Part::Forward(_) => "forward",
            Part::Reply(_) => "reply",
            Part::Unknown { kind, .. } => kind.as_str(),
        }
    }

    /// File id carried by sticker, voice, and file parts.
    pub fn file_id(&self) -> Option<&str> {
        match self {
            Part::Sticker { file_id } | Part::Voice { file_id } => Some(file_id.as_str()),
            Part::File(file) => Some(file.file_id.as_str()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct RawPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

#[derive(Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileRef {
    #[serde(default)]
    file_id: String,
}

#[derive(Default, Serialize, Deserialize)]
struct Quote {
    #[serde(default)]
    message: QuotedMessage,
}

impl From<RawPart> for Part {
    fn from(raw: RawPart) -> Self {
        let RawPart { kind, payload } = raw;
        let decoded = match kind.as_str() {
            "sticker" => serde_json::from_value::<FileRef>(payload.clone())
                .map(|f| Part::Sticker { file_id: f.file_id }),
            "mention" => serde_json::from_value(payload.clone()).map(Part::Mention),
            "voice" => serde_json::from_value::<FileRef>(payload.clone())
                .map(|f| Part::Voice { file_id: f.file_id }),
            "file" => serde_json::from_value(payload.clone()).map(Part::File),
            "forward" => serde_json::from_value::<Quote>(payload.clone()).map(|q| Part::Forward(q.message)),
            "reply" => serde_json::from_value::<Quote>(payload.clone()).map(|q| Part::Reply(q.message)),
            _ => return Part::Unknown { kind, payload },
        };
        match decoded {
            Ok(part) => part,
            Err(e) => {
                tracing::warn!("cannot decode {} part payload: {}", kind, e);
                Part::Unknown { kind, payload }
            }
        }
    }
}

impl From<Part> for RawPart {
    fn from(part: Part) -> Self {
        let kind = part.type_name().to_string();
        let payload = match part {
            Part::Sticker { file_id } | Part::Voice { file_id } => {
                serde_json::to_value(FileRef { file_id })
            }
            Part::Mention(contact) => serde_json::to_value(contact),
            Part::File(file) => serde_json::to_value(file),
            Part::Forward(message) | Part::Reply(message) => serde_json::to_value(Quote { message }),
            Part::Unknown { payload, .. } => Ok(payload),
        };
        RawPart {
            kind,
            payload: payload.unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_parts() {
        let parts: Vec<Part> = serde_json::from_value(serde_json::json!([
            { "type": "sticker", "payload": { "fileId": "2IWuJzaNWCJZxJWCvZhDYuJ5XDsr7hU" } },
            { "type": "mention", "payload": { "firstName": "Name", "userId": "1234567890" } },
            { "type": "file", "payload": { "fileId": "0dC7", "type": "image", "caption": "Look" } },
            { "type": "reply", "payload": { "message": {
                "from": { "userId": "1234567890", "firstName": "Name" },
                "msgId": "6752793278973351456",
                "text": "Original",
                "timestamp": 1566216226
            } } }
        ]))
        .unwrap();

        assert_eq!(parts[0].file_id(), Some("2IWuJzaNWCJZxJWCvZhDYuJ5XDsr7hU"));
        assert!(matches!(&parts[1], Part::Mention(c) if c.user_id == "1234567890"));
        assert!(matches!(&parts[2], Part::File(f) if f.caption == "Look"));
        match &parts[3] {
            Part::Reply(quoted) => {
                assert_eq!(quoted.text, "Original");
                assert_eq!(quoted.from.first_name, "Name");
            }
            other => panic!("expected reply, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_part_type_is_kept() {
        let part: Part = serde_json::from_str(r#"{"type":"poll","payload":{"id":"7"}}"#).unwrap();
        match part {
            Part::Unknown { kind, payload } => {
                assert_eq!(kind, "poll");
                assert_eq!(payload["id"], "7");
            }
            other => panic!("expected unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_bad_payload_falls_back_to_unknown() {
        let part: Part = serde_json::from_str(r#"{"type":"voice","payload":{"fileId":17}}"#).unwrap();
        assert_eq!(part.type_name(), "voice");
        assert!(matches!(part, Part::Unknown { .. }));
    }

    #[test]
    fn test_serialize_restores_wire_shape() {
        let part = Part::Forward(QuotedMessage {
            msg_id: "9".into(),
            text: "fwd".into(),
            ..QuotedMessage::default()
        });
        let value = serde_json::to_value(&part).unwrap();
        assert_eq!(value["type"], "forward");
        assert_eq!(value["payload"]["message"]["msgId"], "9");
    }
}
