//! Scripted transport and fixtures shared by the reconciler tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use chat_transport::{
    ActivationPayload, ActiveChat, ChatId, ChatList, ChatTransport, CustomerUpdate, HistoryPage,
    MessageEvent, OutgoingMessage, PageCursor, Role, SendConfirmation, TransportError, User,
    UserId,
};

use crate::config::WidgetConfig;
use crate::history::RetryPolicy;
use crate::reconciler::Reconciler;
use crate::view::{ViewCommand, ViewSink};

pub type ViewRx = mpsc::UnboundedReceiver<ViewCommand>;

/// Every command the reconciler issued, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListChats,
    StartChat(ActivationPayload),
    ResumeChat(ActivationPayload),
    DeactivateChat(ChatId),
    SendMessage {
        chat_id: ChatId,
        message: OutgoingMessage,
    },
    UpdateCustomer(CustomerUpdate),
    FetchHistoryPage {
        chat_id: ChatId,
        cursor: Option<String>,
    },
}

#[derive(Default)]
struct Inner {
    calls: Vec<RecordedCall>,
    list_results: VecDeque<Result<ChatList, TransportError>>,
    start_results: VecDeque<Result<ActiveChat, TransportError>>,
    resume_results: VecDeque<Result<ActiveChat, TransportError>>,
    deactivate_results: VecDeque<Result<(), TransportError>>,
    send_results: VecDeque<Result<SendConfirmation, TransportError>>,
    update_results: VecDeque<Result<(), TransportError>>,
    history_results: VecDeque<Result<HistoryPage, TransportError>>,
}

/// A [`ChatTransport`] that replays scripted responses and records every
/// call. An unscripted call fails loudly so a test never silently passes
/// on a code path it did not mean to exercise.
#[derive(Default)]
pub struct MockTransport {
    inner: Mutex<Inner>,
}

impl MockTransport {
    pub fn push_list(&self, result: Result<ChatList, TransportError>) {
        self.lock().list_results.push_back(result);
    }

    pub fn push_start(&self, result: Result<ActiveChat, TransportError>) {
        self.lock().start_results.push_back(result);
    }

    pub fn push_resume(&self, result: Result<ActiveChat, TransportError>) {
        self.lock().resume_results.push_back(result);
    }

    pub fn push_deactivate(&self, result: Result<(), TransportError>) {
        self.lock().deactivate_results.push_back(result);
    }

    pub fn push_send(&self, result: Result<SendConfirmation, TransportError>) {
        self.lock().send_results.push_back(result);
    }

    pub fn push_update(&self, result: Result<(), TransportError>) {
        self.lock().update_results.push_back(result);
    }

    pub fn push_history(&self, result: Result<HistoryPage, TransportError>) {
        self.lock().history_results.push_back(result);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("mock transport lock poisoned")
    }

    fn take<R>(
        &self,
        call: RecordedCall,
        pick: impl FnOnce(&mut Inner) -> Option<Result<R, TransportError>>,
        operation: &'static str,
    ) -> Result<R, TransportError> {
        let mut inner = self.lock();
        inner.calls.push(call);
        pick(&mut inner).unwrap_or_else(|| {
            Err(TransportError::command(operation, "no scripted response"))
        })
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn list_chats(&self) -> Result<ChatList, TransportError> {
        self.take(
            RecordedCall::ListChats,
            |i| i.list_results.pop_front(),
            "list_chats",
        )
    }

    async fn start_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError> {
        self.take(
            RecordedCall::StartChat(payload),
            |i| i.start_results.pop_front(),
            "start_chat",
        )
    }

    async fn resume_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError> {
        self.take(
            RecordedCall::ResumeChat(payload),
            |i| i.resume_results.pop_front(),
            "resume_chat",
        )
    }

    async fn deactivate_chat(&self, chat_id: &ChatId) -> Result<(), TransportError> {
        self.take(
            RecordedCall::DeactivateChat(chat_id.clone()),
            |i| i.deactivate_results.pop_front(),
            "deactivate_chat",
        )
    }

    async fn send_message(
        &self,
        chat_id: &ChatId,
        message: OutgoingMessage,
    ) -> Result<SendConfirmation, TransportError> {
        self.take(
            RecordedCall::SendMessage {
                chat_id: chat_id.clone(),
                message,
            },
            |i| i.send_results.pop_front(),
            "send_message",
        )
    }

    async fn update_customer(&self, update: CustomerUpdate) -> Result<(), TransportError> {
        self.take(
            RecordedCall::UpdateCustomer(update),
            |i| i.update_results.pop_front(),
            "update_customer",
        )
    }

    async fn fetch_history_page(
        &self,
        chat_id: &ChatId,
        cursor: Option<&PageCursor>,
    ) -> Result<HistoryPage, TransportError> {
        self.take(
            RecordedCall::FetchHistoryPage {
                chat_id: chat_id.clone(),
                cursor: cursor.map(|c| c.as_str().to_string()),
            },
            |i| i.history_results.pop_front(),
            "fetch_history_page",
        )
    }
}

/// A reconciler wired to the given transport, with no notify endpoint and
/// the default retry policy.
pub fn new_reconciler(transport: Arc<MockTransport>) -> (Reconciler<MockTransport>, ViewRx) {
    let config = WidgetConfig {
        organization_id: "org-test".to_string(),
        client_id: "client-test".to_string(),
        group_id: None,
        region: None,
        notify_url: None,
        theme: Default::default(),
        history_retry: RetryPolicy::default(),
    };
    let (view, rx) = ViewSink::channel();
    (Reconciler::new(transport, view, &config), rx)
}

/// Collect every command emitted so far.
pub fn drain(rx: &mut ViewRx) -> Vec<ViewCommand> {
    let mut commands = Vec::new();
    while let Ok(command) = rx.try_recv() {
        commands.push(command);
    }
    commands
}

pub fn agent(id: &str, name: &str) -> User {
    User {
        id: UserId::from(id),
        name: Some(name.to_string()),
        avatar_url: None,
        role: Role::Agent,
    }
}

pub fn message_event(id: &str, text: &str, author: Option<&str>) -> MessageEvent {
    MessageEvent {
        id: chat_transport::EventId::from(id),
        text: text.to_string(),
        author_id: author.map(UserId::from),
        created_at: Some(chrono::Utc::now()),
        custom_id: None,
    }
}
