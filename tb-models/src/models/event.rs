//! Incoming events delivered by `/events/get`.
//!
//! On the wire every event is `{eventId, type, payload}` with a payload shape
//! keyed by `type`. Here it decodes into `Event { event_id, kind }` where
//! `kind` is a sum type carrying only the fields relevant to that type.
//! Unrecognized types, and payloads that fail to decode, become
//! `EventKind::Unknown` so a single odd event never fails a whole batch.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use tb_core::constants::event_types;

use super::chat::Chat;
use super::message::{ButtonResponse, Message};
use super::part::Part;
use super::user::Contact;

/// Payload of `newMessage`, `editedMessage` and `pinnedMessage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub chat: Chat,
    #[serde(default)]
    pub from: Contact,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<Part>,
}

impl MessagePayload {
    /// A message reference that can be replied to, forwarded, or pinned.
    pub fn to_message(&self) -> Message {
        Message {
            msg_id: self.msg_id.clone(),
            chat_id: self.chat.chat_id.clone(),
            text: self.text.clone(),
            timestamp: self.timestamp,
            ..Message::default()
        }
    }
}

/// Payload of `deletedMessage` and `unpinnedMessage`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    #[serde(default)]
    pub msg_id: String,
    #[serde(default)]
    pub chat: Chat,
    #[serde(default)]
    pub timestamp: i64,
}

/// Payload of `newChatMembers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersJoined {
    #[serde(default)]
    pub chat: Chat,
    #[serde(default)]
    pub new_members: Vec<Contact>,
    #[serde(default)]
    pub added_by: Option<Contact>,
}

/// Payload of `leftChatMembers`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MembersLeft {
    #[serde(default)]
    pub chat: Chat,
    #[serde(default)]
    pub left_members: Vec<Contact>,
    #[serde(default)]
    pub removed_by: Option<Contact>,
}

/// Payload of `callbackQuery`: a user pressed an inline button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackQuery {
    #[serde(default)]
    pub query_id: String,
    #[serde(default)]
    pub from: Contact,
    /// The message the pressed button belongs to.
    #[serde(default)]
    pub message: MessagePayload,
    #[serde(default)]
    pub callback_data: String,
}

impl CallbackQuery {
    /// An empty answer for this query; the API expects one for every press.
    pub fn answer(&self) -> ButtonResponse {
        ButtonResponse::new(self.query_id.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    NewMessage(MessagePayload),
    EditedMessage(MessagePayload),
    DeletedMessage(MessageRef),
    PinnedMessage(MessagePayload),
    UnpinnedMessage(MessageRef),
    NewChatMembers(MembersJoined),
    LeftChatMembers(MembersLeft),
    CallbackQuery(CallbackQuery),
    /// Any other event type, with its payload left undecoded.
    Unknown { kind: String, payload: Value },
}

impl EventKind {
    /// The wire `type` tag.
    pub fn type_name(&self) -> &str {
        match self {
            EventKind::NewMessage(_) => event_types::NEW_MESSAGE,
            EventKind::EditedMessage(_) => event_types::EDITED_MESSAGE,
            EventKind::DeletedMessage(_) => event_types::DELETED_MESSAGE,
            EventKind::PinnedMessage(_) => event_types::PINNED_MESSAGE,
            EventKind::UnpinnedMessage(_) => event_types::UNPINNED_MESSAGE,
            EventKind::NewChatMembers(_) => event_types::NEW_CHAT_MEMBERS,
            EventKind::LeftChatMembers(_) => event_types::LEFT_CHAT_MEMBERS,
            EventKind::CallbackQuery(_) => event_types::CALLBACK_QUERY,
            EventKind::Unknown { kind, .. } => kind.as_str(),
        }
    }

    fn decode(kind: String, payload: Value) -> Self {
        fn typed<T: DeserializeOwned>(
            kind: String,
            payload: Value,
            wrap: fn(T) -> EventKind,
        ) -> EventKind {
            match serde_json::from_value::<T>(payload.clone()) {
                Ok(decoded) => wrap(decoded),
                Err(e) => {
                    tracing::warn!("cannot decode {} event payload: {}", kind, e);
                    EventKind::Unknown { kind, payload }
                }
            }
        }

        match kind.as_str() {
            event_types::NEW_MESSAGE => typed(kind, payload, EventKind::NewMessage),
            event_types::EDITED_MESSAGE => typed(kind, payload, EventKind::EditedMessage),
            event_types::DELETED_MESSAGE => typed(kind, payload, EventKind::DeletedMessage),
            event_types::PINNED_MESSAGE => typed(kind, payload, EventKind::PinnedMessage),
            event_types::UNPINNED_MESSAGE => typed(kind, payload, EventKind::UnpinnedMessage),
            event_types::NEW_CHAT_MEMBERS => typed(kind, payload, EventKind::NewChatMembers),
            event_types::LEFT_CHAT_MEMBERS => typed(kind, payload, EventKind::LeftChatMembers),
            event_types::CALLBACK_QUERY => typed(kind, payload, EventKind::CallbackQuery),
            _ => EventKind::Unknown { kind, payload },
        }
    }

    fn payload(&self) -> Value {
        let encoded = match self {
            EventKind::NewMessage(p) | EventKind::EditedMessage(p) | EventKind::PinnedMessage(p) => {
                serde_json::to_value(p)
            }
            EventKind::DeletedMessage(r) | EventKind::UnpinnedMessage(r) => serde_json::to_value(r),
            EventKind::NewChatMembers(m) => serde_json::to_value(m),
            EventKind::LeftChatMembers(m) => serde_json::to_value(m),
            EventKind::CallbackQuery(q) => serde_json::to_value(q),
            EventKind::Unknown { payload, .. } => Ok(payload.clone()),
        };
        encoded.unwrap_or(Value::Null)
    }
}

/// One event from the bot's event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawEvent", into = "RawEvent")]
pub struct Event {
    /// Monotonic per bot, not necessarily contiguous.
    pub event_id: i64,
    pub kind: EventKind,
}

impl Event {
    /// The chat the event happened in, when the event type has one.
    pub fn chat(&self) -> Option<&Chat> {
        match &self.kind {
            EventKind::NewMessage(p) | EventKind::EditedMessage(p) | EventKind::PinnedMessage(p) => {
                Some(&p.chat)
            }
            EventKind::DeletedMessage(r) | EventKind::UnpinnedMessage(r) => Some(&r.chat),
            EventKind::NewChatMembers(m) => Some(&m.chat),
            EventKind::LeftChatMembers(m) => Some(&m.chat),
            EventKind::CallbackQuery(q) => Some(&q.message.chat),
            EventKind::Unknown { .. } => None,
        }
    }

    /// The message an event refers to, as a reference usable for replies.
    pub fn message(&self) -> Option<Message> {
        match &self.kind {
            EventKind::NewMessage(p) | EventKind::EditedMessage(p) | EventKind::PinnedMessage(p) => {
                Some(p.to_message())
            }
            EventKind::CallbackQuery(q) => Some(q.message.to_message()),
            _ => None,
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEvent {
    event_id: i64,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    payload: Value,
}

impl From<RawEvent> for Event {
    fn from(raw: RawEvent) -> Self {
        Event {
            event_id: raw.event_id,
            kind: EventKind::decode(raw.kind, raw.payload),
        }
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        RawEvent {
            event_id: event.event_id,
            kind: event.kind.type_name().to_string(),
            payload: event.kind.payload(),
        }
    }
}
