//! Data model shared between the transport boundary and the reconciler.
//!
//! Per-message wire fields are camelCase (matching the vendor protocol);
//! ids are transparent newtypes so a chat id can never be passed where a
//! thread id is expected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::event::InboundEvent;

/// Persistent identifier of a support conversation. Outlives its threads.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(String);

/// One continuous segment of events within a chat.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(String);

/// Identifier of a customer or agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Server-assigned identifier of a single event. Stable across replays,
/// which is what makes idempotent re-display possible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(String);

/// Opaque pagination cursor for chat history. Only the backend can
/// interpret it; the client just hands it back for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageCursor(String);

macro_rules! string_id {
    ($($id:ident),*) => {
        $(
            impl $id {
                pub fn new(value: impl Into<String>) -> Self {
                    Self(value.into())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $id {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $id {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )*
    };
}

string_id!(ChatId, ThreadId, UserId, EventId, PageCursor);

/// Which side of the conversation a user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
}

impl Default for Role {
    fn default() -> Self {
        Role::Customer
    }
}

/// A user observed in events. Cached by id on the widget side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "avatar")]
    pub avatar_url: Option<String>,
    #[serde(default, rename = "type")]
    pub role: Role,
}

impl User {
    /// Display name with the wire format's fallback for nameless agents.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Agent")
    }
}

/// One entry of the existing-chats query result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: ChatId,
    #[serde(default)]
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_thread_id: Option<ThreadId>,
}

/// Result of listing the customer's existing chats.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatList {
    #[serde(default, rename = "chatsSummary")]
    pub summaries: Vec<ChatSummary>,
    #[serde(default)]
    pub total_chats: u32,
}

/// One thread of a chat, as returned by start/resume and history pages.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Thread {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ThreadId>,
    #[serde(default)]
    pub events: Vec<InboundEvent>,
}

/// A chat the backend considers started or resumed, with its live thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveChat {
    pub id: ChatId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread: Option<Thread>,
}

/// A message event as delivered by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageEvent {
    pub id: EventId,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Echo of the client-chosen id for messages this customer sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_id: Option<String>,
}

/// A message on its way out. `custom_id` is the widget-local id, echoed
/// back in confirmations and thread replays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingMessage {
    pub custom_id: String,
    pub text: String,
}

/// Payload for start-or-resume. Resume iff `chat_id` is set; `events`
/// become the initial content of the new thread, in order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivationPayload {
    pub chat_id: Option<ChatId>,
    pub events: Vec<OutgoingMessage>,
}

/// Delivery confirmation for a sent message.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendConfirmation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_id: Option<EventId>,
}

/// Fields of the customer profile the widget may update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// One page of chat history. `done` means the source is exhausted;
/// otherwise `cursor` fetches the next (older) page.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HistoryPage {
    #[serde(default)]
    pub threads: Vec<Thread>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<PageCursor>,
    #[serde(default)]
    pub done: bool,
}
