//! # Chat Transport
//!
//! Canonical types for talking to the third-party real-time chat backend.
//!
//! The vendor client is a black box as far as this workspace is concerned:
//! it pushes events and accepts commands. This crate pins down that boundary
//! as Rust types so everything behind it (the session reconciler in
//! `chat_widget`) works against one canonical shape:
//!
//! - [`TransportEvent`] — the push-event stream, a tagged union. Payload
//!   quirks of the wire format (e.g. the deactivation chat id arriving under
//!   two different key names) are normalized here and never leak further.
//! - [`ChatTransport`] — the command sink: list/start/resume/deactivate a
//!   chat, send a message, update the customer profile, fetch history pages.
//! - [`TransportError`] — command failures. These are always recoverable;
//!   callers convert them into bounded UI effects.
//!
//! The crate does no I/O of its own. A production binding wraps the vendor
//! SDK; tests substitute a scripted implementation of [`ChatTransport`].

mod client;
mod error;
mod event;
mod types;

pub use client::ChatTransport;
pub use error::TransportError;
pub use event::{DisconnectReason, InboundEvent, TransportEvent};
pub use types::{
    ActivationPayload, ActiveChat, ChatId, ChatList, ChatSummary, CustomerUpdate, EventId,
    HistoryPage, MessageEvent, OutgoingMessage, PageCursor, Role, SendConfirmation, Thread,
    ThreadId, User, UserId,
};
