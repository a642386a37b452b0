//! Push events delivered by the transport.
//!
//! This is the normalization boundary: whatever shape the vendor stream
//! uses, the reconciler only ever sees these canonical variants. Unknown
//! event kinds and unknown inbound-event types deserialize into catch-all
//! variants and are treated as no-ops downstream.

use serde::{Deserialize, Serialize};

use crate::types::{ActiveChat, ChatId, MessageEvent, User, UserId};

/// Why the transport dropped the connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// The backend closed the session because the customer went quiet.
    InactivityTimeout,
    #[serde(untagged)]
    Other(String),
}

/// Everything the transport can push at the widget, in arrival order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// Initial connection established; the widget should discover chats.
    Connected,
    /// Transport recovered after a drop.
    ConnectionRestored,
    /// Transport lost; it will retry on its own.
    ConnectionLost,
    /// Transport gave up or the backend closed the session.
    Disconnected {
        #[serde(default)]
        reason: Option<DisconnectReason>,
    },
    /// The backend assigned (or re-announced) the local customer identity.
    CustomerIdAssigned { customer_id: UserId },
    /// Profile data for a user observed on this connection.
    UserProfileUpdated { user: User },
    UserJoinedChat {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        user: User,
    },
    UserLeftChat {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        user: User,
    },
    TypingStarted {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        user_id: UserId,
    },
    TypingStopped {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        user_id: UserId,
    },
    /// Agent-side draft preview; surfaced as a "processing" indicator,
    /// never as a literal message.
    SneakPeek {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        is_typing: bool,
    },
    /// A chat was started server-side (e.g. an agent reached out).
    IncomingChat { chat: ActiveChat },
    /// A chat ended. The id arrives under `chat_id` or `chatId` on the
    /// wire; both land in the one canonical field here.
    ChatDeactivated {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        #[serde(default)]
        reason: Option<DisconnectReason>,
    },
    /// A thread event (message, system message, ...) for a chat.
    IncomingEvent {
        #[serde(alias = "chatId")]
        chat_id: ChatId,
        event: InboundEvent,
    },
    /// Anything this version does not recognize. Ignored.
    #[serde(other)]
    Other,
}

/// A single event inside a thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    Message(MessageEvent),
    SystemMessage {
        #[serde(default)]
        text: Option<String>,
        #[serde(default, rename = "systemMessageType")]
        system_message_type: Option<String>,
    },
    /// Rich messages, postbacks, and other kinds the widget does not render.
    #[serde(other)]
    Other,
}
