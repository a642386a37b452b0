//! Session state for one widget instance.
//!
//! A handful of flags, not an enum, because several of them vary
//! independently (a chat can be inactive while the transport is down, the
//! closing flag overlaps activation, ...). [`Session::phase`] derives the
//! coarse lifecycle state for logging and tests.

use chat_transport::{ChatId, ThreadId};

/// Coarse lifecycle phase derived from the session flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Connected, no chat discovered or started yet.
    NoChat,
    /// A chat id is known but the chat is deactivated (resumable).
    Inactive,
    /// A start-or-resume command is in flight.
    Activating,
    /// Chat is live; the composer sends directly.
    Active,
    /// The chat ended out from under the user; waiting for them to resume.
    AwaitingReconnect,
}

/// All state the reconciler keeps about the one tracked chat.
///
/// `chat_id` persists across deactivation so the session can be resumed;
/// it is only cleared when the widget is torn down.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub chat_id: Option<ChatId>,
    pub thread_id: Option<ThreadId>,
    pub is_active: bool,
    pub is_activating: bool,
    pub waiting_for_reconnect: bool,
    /// Set while the user's own end-chat command is outstanding, so the
    /// matching deactivation push is not reported a second time.
    pub is_closing_intentionally: bool,
    pub transport_connected: bool,
}

impl Session {
    /// Enter the active state. Clears the flags that are mutually
    /// exclusive with it, keeping the `is_active`/`waiting_for_reconnect`
    /// invariant by construction.
    pub fn activate(&mut self) {
        self.is_active = true;
        self.is_activating = false;
        self.waiting_for_reconnect = false;
    }

    /// The chat ended without the user asking for it; park until they
    /// click resume.
    pub fn await_reconnect(&mut self) {
        self.is_active = false;
        self.is_activating = false;
        self.waiting_for_reconnect = true;
    }

    pub fn is_tracked(&self, chat_id: &ChatId) -> bool {
        self.chat_id.as_ref() == Some(chat_id)
    }

    pub fn phase(&self) -> Phase {
        if self.waiting_for_reconnect {
            Phase::AwaitingReconnect
        } else if self.is_active {
            Phase::Active
        } else if self.is_activating {
            Phase::Activating
        } else if self.chat_id.is_some() {
            Phase::Inactive
        } else {
            Phase::NoChat
        }
    }
}
