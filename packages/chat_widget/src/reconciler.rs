//! The session reconciler.
//!
//! One owner for every piece of widget session state. Transport events and
//! UI intents both funnel into `&mut self` methods on [`Reconciler`], which
//! mutate the state and emit [`ViewCommand`]s describing what the surface
//! should look like now. Transport commands are awaited inline, so a
//! completion can never observe state newer than the command that caused
//! it.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use chat_transport::{
    ActivationPayload, ActiveChat, ChatId, ChatTransport, CustomerUpdate, DisconnectReason,
    InboundEvent, MessageEvent, OutgoingMessage, Role, TransportEvent, User,
};

use crate::config::WidgetConfig;
use crate::error::WidgetError;
use crate::history::{HistoryCursor, RetryPolicy};
use crate::notifier::BackendNotifier;
use crate::pending::{PendingMessage, PendingQueue};
use crate::session::Session;
use crate::transcript::{Transcript, TranscriptEntry};
use crate::users::UserCache;
use crate::view::{ViewCommand, ViewSink};

// User-facing copy. Kept in one place so tests can assert on it.
pub(crate) const NOTICE_CONNECTION_RESTORED: &str = "Connection restored";
pub(crate) const NOTICE_CONNECTION_LOST: &str = "Connection lost. Reconnecting...";
pub(crate) const NOTICE_INACTIVITY: &str =
    "Chat ended automatically due to your inactivity. Feel free to start it again.";
pub(crate) const NOTICE_CHAT_ENDED_OTHER: &str = "Chat ended";
pub(crate) const NOTICE_CHAT_CLOSED: &str = "Chat ended. Feel free to start a new conversation.";
pub(crate) const NOTICE_START_FAILED: &str = "Failed to start chat. Please try again.";
pub(crate) const REASON_DISCONNECTED: &str = "Disconnected";
pub(crate) const REASON_CHAT_INACTIVE: &str = "Chat inactive";
pub(crate) const LABEL_RESUME: &str = "Resume chat";

/// System-message kinds that must never surface as notices.
const EXCLUDED_SYSTEM_MESSAGES: &[&str] = &["manual_archived_customer"];

pub struct Reconciler<T: ChatTransport> {
    transport: Arc<T>,
    view: ViewSink,
    notifier: BackendNotifier,
    session: Session,
    users: UserCache,
    pending: PendingQueue,
    history: HistoryCursor,
    transcript: Transcript,
    /// The agent currently handling the tracked chat, for transfer and
    /// departure notices.
    current_agent: Option<User>,
    retry: RetryPolicy,
}

impl<T: ChatTransport> Reconciler<T> {
    pub fn new(transport: Arc<T>, view: ViewSink, config: &WidgetConfig) -> Self {
        Self {
            transport,
            view,
            notifier: BackendNotifier::new(config.notify_url.clone()),
            session: Session::default(),
            users: UserCache::default(),
            pending: PendingQueue::default(),
            history: HistoryCursor::default(),
            transcript: Transcript::default(),
            current_agent: None,
            retry: config.history_retry,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    // ── transport events ────────────────────────────────────────────────

    pub async fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Connected => {
                self.session.transport_connected = true;
                self.on_connected().await;
            }
            TransportEvent::ConnectionRestored => {
                self.session.transport_connected = true;
                self.view.notice(NOTICE_CONNECTION_RESTORED);
                if !self.session.waiting_for_reconnect && !self.session.is_activating {
                    self.view.emit(ViewCommand::EnableComposer);
                }
            }
            TransportEvent::ConnectionLost => {
                self.session.transport_connected = false;
                self.view.notice(NOTICE_CONNECTION_LOST);
                self.view.emit(ViewCommand::DisableComposer {
                    reason: REASON_DISCONNECTED.to_string(),
                });
            }
            TransportEvent::Disconnected { reason } => self.on_disconnected(reason),
            TransportEvent::CustomerIdAssigned { customer_id } => {
                debug!(%customer_id, "customer identity assigned");
                self.users.set_customer_id(customer_id);
            }
            TransportEvent::UserProfileUpdated { user } => self.users.insert(user),
            TransportEvent::UserJoinedChat { chat_id, user } => self.on_user_joined(chat_id, user),
            TransportEvent::UserLeftChat { chat_id, user } => self.on_user_left(chat_id, user),
            TransportEvent::TypingStarted { chat_id, user_id } => {
                if self.session.is_tracked(&chat_id) && self.users.is_agent_id(&user_id) {
                    self.view.emit(ViewCommand::ShowTyping);
                }
            }
            TransportEvent::TypingStopped { chat_id, user_id } => {
                if self.session.is_tracked(&chat_id) && self.users.is_agent_id(&user_id) {
                    self.view.emit(ViewCommand::HideTyping);
                }
            }
            TransportEvent::SneakPeek { chat_id, is_typing } => {
                if self.session.is_tracked(&chat_id) {
                    self.view.emit(if is_typing {
                        ViewCommand::ShowProcessing
                    } else {
                        ViewCommand::HideProcessing
                    });
                }
            }
            TransportEvent::IncomingChat { chat } => self.on_chat_started(chat).await,
            TransportEvent::ChatDeactivated { chat_id, reason } => {
                self.on_chat_deactivated(chat_id, reason);
            }
            TransportEvent::IncomingEvent { chat_id, event } => {
                self.on_incoming_event(chat_id, event);
            }
            TransportEvent::Other => debug!("ignoring unrecognized transport event"),
        }
    }

    /// Connection is up: discover existing chats and pick the surface to
    /// show. On a reconnect with a chat already tracked, the session state
    /// is authoritative and the discovery result is only logged.
    async fn on_connected(&mut self) {
        let list = match self.transport.list_chats().await {
            Ok(list) => list,
            Err(err) => {
                warn!(%err, "chat discovery failed; starting fresh");
                self.view.emit(ViewCommand::ShowPreChat { resume: false });
                return;
            }
        };

        if self.session.chat_id.is_some() {
            debug!(total = list.total_chats, "reconnected with tracked chat");
            if !self.session.waiting_for_reconnect && !self.session.is_activating {
                self.view.emit(ViewCommand::EnableComposer);
            }
            return;
        }

        match list.summaries.first() {
            None => {
                info!("no existing chats; showing pre-chat prompt");
                self.view.emit(ViewCommand::ShowPreChat { resume: false });
            }
            Some(summary) if !summary.active => {
                info!(chat_id = %summary.id, "found deactivated chat; offering resume");
                self.session.chat_id = Some(summary.id.clone());
                self.view.emit(ViewCommand::ShowPreChat { resume: true });
            }
            Some(summary) => {
                info!(chat_id = %summary.id, "found active chat; restoring session");
                self.session.chat_id = Some(summary.id.clone());
                self.session.thread_id = summary.last_thread_id.clone();
                self.session.activate();
                self.load_initial_history().await;
                self.view.emit(ViewCommand::ShowChatView);
                self.view.emit(ViewCommand::EnableComposer);
            }
        }
    }

    fn on_disconnected(&mut self, reason: Option<DisconnectReason>) {
        self.session.transport_connected = false;
        if self.session.is_closing_intentionally {
            debug!("disconnect during intentional close; ignoring");
            return;
        }
        match reason {
            Some(DisconnectReason::InactivityTimeout) => {
                if self.session.waiting_for_reconnect {
                    return;
                }
                info!("session closed for inactivity");
                self.session.await_reconnect();
                self.current_agent = None;
                self.view.emit(ViewCommand::ShowChatView);
                self.view.emit(ViewCommand::DisableComposer {
                    reason: REASON_CHAT_INACTIVE.to_string(),
                });
                self.view.notice(NOTICE_INACTIVITY);
                self.view.emit(ViewCommand::ShowResumeControl {
                    caption: LABEL_RESUME.to_string(),
                });
            }
            _ => {
                self.view.emit(ViewCommand::DisableComposer {
                    reason: REASON_DISCONNECTED.to_string(),
                });
            }
        }
    }

    /// A user joined the tracked chat. Only agent arrivals are announced;
    /// a second agent arriving while one is present reads as a transfer.
    fn on_user_joined(&mut self, chat_id: ChatId, user: User) {
        self.users.insert(user.clone());
        if !self.session.is_tracked(&chat_id)
            || user.role != Role::Agent
            || self.users.customer_id() == Some(&user.id)
        {
            return;
        }
        match &self.current_agent {
            Some(current) if current.id == user.id => {}
            Some(current) => {
                self.view.notice(format!(
                    "Chat transferred: from {} to {}",
                    current.display_name(),
                    user.display_name()
                ));
            }
            None => {
                self.view
                    .notice(format!("{} joined the chat", user.display_name()));
            }
        }
        self.current_agent = Some(user);
    }

    /// The handling agent leaving stays silent and stays recorded: a
    /// transfer arrives as "left" then "joined", and the transfer notice
    /// needs the previous agent still on file when the replacement joins.
    /// The record is only dropped when the tracked chat ends. Any other
    /// agent's exit is announced.
    fn on_user_left(&mut self, chat_id: ChatId, user: User) {
        if !self.session.is_tracked(&chat_id)
            || user.role != Role::Agent
            || self.users.customer_id() == Some(&user.id)
        {
            return;
        }
        if self.current_agent.as_ref().map(|a| &a.id) == Some(&user.id) {
            debug!(user_id = %user.id, "handling agent left");
        } else {
            self.view
                .notice(format!("{} left the chat", user.display_name()));
        }
    }

    fn on_chat_deactivated(&mut self, chat_id: ChatId, reason: Option<DisconnectReason>) {
        if !self.session.is_tracked(&chat_id) {
            // Some other chat of this customer ended; report it without
            // touching the tracked session.
            self.view.notice(NOTICE_CHAT_ENDED_OTHER);
            return;
        }
        if self.session.is_closing_intentionally {
            debug!(%chat_id, "deactivation confirms our own close; suppressing notice");
            self.session.is_closing_intentionally = false;
            self.session.is_active = false;
            self.current_agent = None;
            return;
        }
        if self.session.waiting_for_reconnect {
            debug!(%chat_id, ?reason, "duplicate deactivation while parked");
            return;
        }
        info!(%chat_id, ?reason, "tracked chat deactivated");
        self.session.await_reconnect();
        self.current_agent = None;
        self.view.emit(ViewCommand::ShowChatView);
        self.view.emit(ViewCommand::DisableComposer {
            reason: REASON_CHAT_INACTIVE.to_string(),
        });
        self.view.notice(NOTICE_INACTIVITY);
        self.view.emit(ViewCommand::ShowResumeControl {
            caption: LABEL_RESUME.to_string(),
        });
    }

    fn on_incoming_event(&mut self, chat_id: ChatId, event: InboundEvent) {
        if !self.session.is_tracked(&chat_id) {
            debug!(%chat_id, "thread event for untracked chat; ignoring");
            return;
        }
        match event {
            InboundEvent::Message(message) => {
                self.view.emit(ViewCommand::HideProcessing);
                self.ingest_message(message);
            }
            InboundEvent::SystemMessage {
                text,
                system_message_type,
            } => self.ingest_system_message(text, system_message_type),
            InboundEvent::Other => debug!("unrenderable thread event; ignoring"),
        }
    }

    /// Insert one message into the transcript, idempotently. A message
    /// carrying our own `custom_id` is the echo of an optimistic entry
    /// already on screen; it confirms delivery instead of rendering twice.
    fn ingest_message(&mut self, message: MessageEvent) {
        if let Some(custom_id) = &message.custom_id
            && self.transcript.contains(custom_id)
        {
            self.view.emit(ViewCommand::MarkSent {
                id: custom_id.clone(),
            });
            return;
        }
        let entry = self.entry_from_message(&message);
        if self.transcript.append(entry.clone()) {
            self.view.emit(ViewCommand::AppendMessage(entry));
        } else {
            debug!(event_id = %message.id, "duplicate message event; ignoring");
        }
    }

    fn ingest_system_message(&mut self, text: Option<String>, kind: Option<String>) {
        if let Some(kind) = &kind
            && EXCLUDED_SYSTEM_MESSAGES.contains(&kind.as_str())
        {
            debug!(%kind, "suppressed system message");
            return;
        }
        if let Some(text) = text {
            self.view.notice(text);
        }
    }

    fn entry_from_message(&self, message: &MessageEvent) -> TranscriptEntry {
        let role = self.users.attribute(message.author_id.as_ref());
        let author = message
            .author_id
            .as_ref()
            .and_then(|id| self.users.get(id))
            .cloned();
        TranscriptEntry {
            id: message.id.to_string(),
            text: message.text.clone(),
            role,
            author,
            at: message.created_at.unwrap_or_else(Utc::now),
        }
    }

    // ── UI intents ──────────────────────────────────────────────────────

    /// The pre-chat form was submitted. Pushes the name to the customer
    /// profile, then starts or resumes the session.
    pub async fn submit_prechat(&mut self, name: &str) -> Result<(), WidgetError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WidgetError::EmptyName);
        }
        let update = CustomerUpdate {
            name: Some(name.to_string()),
        };
        if let Err(err) = self.transport.update_customer(update).await {
            warn!(%err, "customer update failed");
            self.view.notice(NOTICE_START_FAILED);
            return Err(err.into());
        }
        self.activate_session().await;
        Ok(())
    }

    /// The user submitted the composer. The message is rendered
    /// optimistically under a widget-local id, which is returned so the
    /// caller can correlate later sent/failed markers. With no live
    /// session, the message queues and triggers activation.
    pub async fn send_message(&mut self, text: &str) -> Option<String> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let local_id = format!("msg_{}", Uuid::new_v4().simple());
        let entry = TranscriptEntry {
            id: local_id.clone(),
            text: text.to_string(),
            role: Role::Customer,
            author: None,
            at: Utc::now(),
        };
        self.transcript.append(entry.clone());
        self.view.emit(ViewCommand::AppendMessage(entry));

        if self.session.is_active
            && let Some(chat_id) = self.session.chat_id.clone()
        {
            let message = OutgoingMessage {
                custom_id: local_id.clone(),
                text: text.to_string(),
            };
            match self.transport.send_message(&chat_id, message).await {
                Ok(confirmation) => {
                    debug!(event_id = ?confirmation.event_id, "message delivered");
                    self.view.emit(ViewCommand::MarkSent {
                        id: local_id.clone(),
                    });
                    self.notifier.notify(
                        self.session.chat_id.clone(),
                        self.session.thread_id.clone(),
                    );
                }
                Err(err) => {
                    warn!(%err, "message send failed");
                    self.view.emit(ViewCommand::MarkFailed {
                        id: local_id.clone(),
                    });
                }
            }
        } else {
            self.pending.push(PendingMessage {
                local_id: local_id.clone(),
                text: text.to_string(),
            });
            if !self.session.is_activating {
                self.activate_session().await;
            }
        }
        Some(local_id)
    }

    /// The user asked to end the chat. The ending UI shows immediately;
    /// the closing flag stays up until the matching deactivation event
    /// confirms, so that event is not reported a second time.
    pub async fn end_chat(&mut self) {
        let Some(chat_id) = self.session.chat_id.clone() else {
            return;
        };
        if !self.session.is_active {
            return;
        }
        self.session.is_closing_intentionally = true;
        self.view.notice(NOTICE_CHAT_CLOSED);
        self.view.emit(ViewCommand::HideComposer);
        self.view.emit(ViewCommand::ShowResumeControl {
            caption: LABEL_RESUME.to_string(),
        });
        match self.transport.deactivate_chat(&chat_id).await {
            Ok(()) => {
                self.session.is_active = false;
                self.history.reset();
            }
            Err(err) => {
                warn!(%err, "deactivation failed; restoring chat UI");
                self.session.is_closing_intentionally = false;
                self.view.emit(ViewCommand::HideResumeControl);
                self.view.emit(ViewCommand::EnableComposer);
            }
        }
    }

    /// The user clicked the resume affordance. Returns the surface to the
    /// pre-chat prompt; the actual resume happens when they submit it.
    pub fn resume_clicked(&mut self) {
        self.session.waiting_for_reconnect = false;
        self.transcript.clear();
        self.view.emit(ViewCommand::ClearTranscript);
        self.view.emit(ViewCommand::HideResumeControl);
        self.view.emit(ViewCommand::ShowPreChat {
            resume: self.session.chat_id.is_some(),
        });
    }

    /// The user scrolled to the top of the transcript.
    pub async fn load_more_history(&mut self) -> Result<(), WidgetError> {
        self.load_history_page().await
    }

    // ── session activation ──────────────────────────────────────────────

    /// Start or resume the chat, seeding the new thread with everything
    /// queued so far. On failure the queue is emptied and each entry is
    /// marked failed, so nothing lingers to be resent by surprise.
    async fn activate_session(&mut self) {
        self.session.is_activating = true;
        let payload = ActivationPayload {
            chat_id: self.session.chat_id.clone(),
            events: self
                .pending
                .iter()
                .map(|m| OutgoingMessage {
                    custom_id: m.local_id.clone(),
                    text: m.text.clone(),
                })
                .collect(),
        };
        let resuming = payload.chat_id.is_some();
        let result = if resuming {
            self.transport.resume_chat(payload).await
        } else {
            self.transport.start_chat(payload).await
        };
        match result {
            Ok(chat) => self.on_chat_started(chat).await,
            Err(err) => {
                warn!(%err, resuming, "chat activation failed");
                self.session.is_activating = false;
                for message in self.pending.drain() {
                    self.view.emit(ViewCommand::MarkFailed {
                        id: message.local_id,
                    });
                }
                self.view.notice(NOTICE_START_FAILED);
            }
        }
    }

    /// A chat is live, either because we started/resumed it or because the
    /// backend pushed one at us. Queued messages became the thread seed
    /// server-side, so they flip to sent here. A resumed chat reloads its
    /// history before the live thread replays on top of it.
    async fn on_chat_started(&mut self, chat: ActiveChat) {
        let resumed = self.session.chat_id.as_ref() == Some(&chat.id);
        info!(chat_id = %chat.id, resumed, "chat session live");
        self.session.chat_id = Some(chat.id.clone());
        self.session.thread_id = chat.thread.as_ref().and_then(|t| t.id.clone());
        self.session.activate();

        for message in self.pending.drain() {
            self.view.emit(ViewCommand::MarkSent {
                id: message.local_id,
            });
        }
        self.view.emit(ViewCommand::HidePreChat);
        self.view.emit(ViewCommand::ShowChatView);
        self.view.emit(ViewCommand::EnableComposer);

        if resumed {
            self.load_initial_history().await;
        } else {
            self.history.mark_done();
        }
        if let Some(thread) = chat.thread {
            for event in thread.events {
                match event {
                    InboundEvent::Message(message) => self.ingest_message(message),
                    InboundEvent::SystemMessage {
                        text,
                        system_message_type,
                    } => self.ingest_system_message(text, system_message_type),
                    InboundEvent::Other => {}
                }
            }
        }
    }

    // ── history ─────────────────────────────────────────────────────────

    /// First load after a chat becomes visible. Bounded retries; giving up
    /// leaves an empty transcript rather than an error surface, and the
    /// cursor stays re-armed for a manual scroll.
    async fn load_initial_history(&mut self) {
        self.history.reset();
        for attempt in 1..=self.retry.attempts.max(1) {
            match self.load_history_page().await {
                Ok(()) => return,
                Err(err) => warn!(attempt, %err, "initial history load failed"),
            }
        }
    }

    async fn load_history_page(&mut self) -> Result<(), WidgetError> {
        let Some(chat_id) = self.session.chat_id.clone() else {
            return Ok(());
        };
        if !self.history.begin() {
            return Ok(());
        }
        let cursor = self.history.cursor().cloned();
        match self
            .transport
            .fetch_history_page(&chat_id, cursor.as_ref())
            .await
        {
            Ok(page) => {
                let mut entries = Vec::new();
                for thread in &page.threads {
                    for event in &thread.events {
                        if let InboundEvent::Message(message) = event {
                            // An echo of a message that is already on
                            // screen under its local id.
                            if let Some(custom_id) = &message.custom_id
                                && self.transcript.contains(custom_id)
                            {
                                continue;
                            }
                            entries.push(self.entry_from_message(message));
                        }
                    }
                }
                let fresh = self.transcript.prepend_batch(entries);
                if !fresh.is_empty() {
                    self.view.emit(ViewCommand::PrependHistory(fresh));
                }
                self.history.complete(page.cursor, page.done);
                Ok(())
            }
            Err(err) => {
                self.history.fail();
                Err(err.into())
            }
        }
    }
}


#[cfg(test)]
impl<T: ChatTransport> Reconciler<T> {
    pub(crate) fn history_status(&self) -> crate::history::HistoryStatus {
        self.history.status()
    }
}
