//! # Chat Widget
//!
//! Session reconciliation core for an embeddable support-chat widget.
//!
//! The widget's presentation is whatever the host embeds it in; this crate
//! owns everything underneath it. One [`Reconciler`] per widget instance
//! holds the authoritative session state and reconciles it against two
//! inputs:
//!
//! ```text
//!   push events ──► TransportEvent ──┐
//!                                    ├──► Reconciler ──► ViewCommand ──► surface
//!   UI intents  ──► &mut self calls ─┘         │
//!                                              ▼
//!                                   ChatTransport commands
//! ```
//!
//! Transport commands are awaited inline on the reconciler's own task, so
//! state transitions and their completions are strictly ordered; the view
//! receives an append-only command stream it can apply without knowing any
//! of the rules.
//!
//! The state itself lives in small focused modules: [`session`] (lifecycle
//! flags), [`pending`] (messages typed before a session exists),
//! [`history`] (pagination cursor), [`transcript`] (idempotent message
//! list), and [`users`] (identity cache and attribution).

pub mod config;
pub mod error;
pub mod history;
pub mod notifier;
pub mod pending;
pub mod reconciler;
pub mod session;
pub mod transcript;
pub mod users;
pub mod view;

#[cfg(test)]
mod test_helpers;

pub use config::{FileConfig, WidgetConfig, load_config};
pub use error::WidgetError;
pub use reconciler::Reconciler;
pub use session::{Phase, Session};
pub use transcript::{Transcript, TranscriptEntry};
pub use view::{ScrollMetrics, ViewCommand, ViewSink, offset_preserving_bottom_distance};
