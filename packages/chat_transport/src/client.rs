use async_trait::async_trait;

use crate::error::TransportError;
use crate::types::{
    ActivationPayload, ActiveChat, ChatId, ChatList, CustomerUpdate, HistoryPage,
    OutgoingMessage, PageCursor, SendConfirmation,
};

/// Command surface of the real-time chat backend.
///
/// A production implementation wraps the vendor SDK; tests script one.
/// Every method is a single request/response exchange — connection
/// management and event delivery happen out of band through the push
/// stream ([`crate::TransportEvent`]).
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Query the customer's existing chats.
    async fn list_chats(&self) -> Result<ChatList, TransportError>;

    /// Start a brand-new chat. `payload.events` seed the first thread.
    async fn start_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError>;

    /// Reactivate a previously deactivated chat (`payload.chat_id` must be
    /// set). `payload.events` seed the new thread.
    async fn resume_chat(&self, payload: ActivationPayload) -> Result<ActiveChat, TransportError>;

    /// End a chat. The backend follows up with a deactivation push event.
    async fn deactivate_chat(&self, chat_id: &ChatId) -> Result<(), TransportError>;

    /// Send one message into an active chat.
    async fn send_message(
        &self,
        chat_id: &ChatId,
        message: OutgoingMessage,
    ) -> Result<SendConfirmation, TransportError>;

    /// Update the customer profile (e.g. the pre-chat name).
    async fn update_customer(&self, update: CustomerUpdate) -> Result<(), TransportError>;

    /// Fetch one page of history. `cursor = None` requests the newest page;
    /// pages walk backwards in time from there.
    async fn fetch_history_page(
        &self,
        chat_id: &ChatId,
        cursor: Option<&PageCursor>,
    ) -> Result<HistoryPage, TransportError>;
}
