//! Drives a full widget session against a scripted transport and prints
//! the view-command stream a real surface would render.
//!
//! Run with: `cargo run -p chat_widget --example scripted_session`

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedReceiver;

use chat_transport::{
    ActivationPayload, ActiveChat, ChatId, ChatList, ChatTransport, CustomerUpdate, HistoryPage,
    InboundEvent, MessageEvent, OutgoingMessage, PageCursor, Role, SendConfirmation, Thread,
    ThreadId, TransportError, TransportEvent, User, UserId,
};
use chat_widget::history::RetryPolicy;
use chat_widget::{Reconciler, ViewCommand, ViewSink, WidgetConfig};

/// A backend that accepts everything and never pushes on its own.
struct ScriptedTransport;

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn list_chats(&self) -> Result<ChatList, TransportError> {
        Ok(ChatList::default())
    }

    async fn start_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError> {
        Ok(ActiveChat {
            id: ChatId::from("chat-demo"),
            thread: Some(Thread {
                id: Some(ThreadId::from("thread-1")),
                events: payload
                    .events
                    .iter()
                    .enumerate()
                    .map(|(n, m)| {
                        InboundEvent::Message(MessageEvent {
                            id: chat_transport::EventId::new(format!("ev-{n}")),
                            text: m.text.clone(),
                            author_id: Some(UserId::from("customer-demo")),
                            created_at: Some(chrono::Utc::now()),
                            custom_id: Some(m.custom_id.clone()),
                        })
                    })
                    .collect(),
            }),
        })
    }

    async fn resume_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError> {
        self.start_chat(payload).await
    }

    async fn deactivate_chat(&self, _chat_id: &ChatId) -> Result<(), TransportError> {
        Ok(())
    }

    async fn send_message(
        &self,
        _chat_id: &ChatId,
        _message: OutgoingMessage,
    ) -> Result<SendConfirmation, TransportError> {
        Ok(SendConfirmation::default())
    }

    async fn update_customer(&self, _update: CustomerUpdate) -> Result<(), TransportError> {
        Ok(())
    }

    async fn fetch_history_page(
        &self,
        _chat_id: &ChatId,
        _cursor: Option<&PageCursor>,
    ) -> Result<HistoryPage, TransportError> {
        Ok(HistoryPage {
            threads: Vec::new(),
            cursor: None,
            done: true,
        })
    }
}

fn render(label: &str, rx: &mut UnboundedReceiver<ViewCommand>) {
    println!("── {label}");
    while let Ok(command) = rx.try_recv() {
        println!("   {command:?}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chat_widget=info".into()),
        )
        .init();

    let config = WidgetConfig {
        organization_id: "org-demo".to_string(),
        client_id: "client-demo".to_string(),
        group_id: None,
        region: None,
        notify_url: None,
        theme: Default::default(),
        history_retry: RetryPolicy::default(),
    };
    let (view, mut rx) = ViewSink::channel();
    let mut reconciler = Reconciler::new(Arc::new(ScriptedTransport), view, &config);

    reconciler.handle_event(TransportEvent::Connected).await;
    render("connected (no existing chats)", &mut rx);

    reconciler
        .handle_event(TransportEvent::CustomerIdAssigned {
            customer_id: UserId::from("customer-demo"),
        })
        .await;

    reconciler.submit_prechat("Ada").await?;
    render("pre-chat submitted", &mut rx);

    reconciler
        .handle_event(TransportEvent::UserJoinedChat {
            chat_id: ChatId::from("chat-demo"),
            user: User {
                id: UserId::from("agent-1"),
                name: Some("Sam".to_string()),
                avatar_url: None,
                role: Role::Agent,
            },
        })
        .await;
    render("agent joined", &mut rx);

    reconciler.send_message("Hi, my order never arrived.").await;
    render("customer message sent", &mut rx);

    reconciler
        .handle_event(TransportEvent::IncomingEvent {
            chat_id: ChatId::from("chat-demo"),
            event: InboundEvent::Message(MessageEvent {
                id: chat_transport::EventId::from("ev-agent-1"),
                text: "Let me look that up for you.".to_string(),
                author_id: Some(UserId::from("agent-1")),
                created_at: Some(chrono::Utc::now()),
                custom_id: None,
            }),
        })
        .await;
    render("agent replied", &mut rx);

    reconciler.end_chat().await;
    reconciler
        .handle_event(TransportEvent::ChatDeactivated {
            chat_id: ChatId::from("chat-demo"),
            reason: None,
        })
        .await;
    render("chat ended by the customer", &mut rx);

    Ok(())
}
