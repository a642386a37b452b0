//! One-shot backend notification after a confirmed message send.
//!
//! Pure side channel: the response is logged, never gates UI state, and
//! failures are absorbed here.

use chat_transport::{ChatId, ThreadId};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct BackendNotifier {
    client: reqwest::Client,
    url: Option<String>,
}

impl BackendNotifier {
    pub fn new(url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Fire-and-forget `POST {chat_id, thread_id}`. Skipped (with a debug
    /// log) when no endpoint is configured or no chat is tracked.
    pub fn notify(&self, chat_id: Option<ChatId>, thread_id: Option<ThreadId>) {
        let (Some(url), Some(chat_id)) = (self.url.clone(), chat_id) else {
            debug!("skipping backend notification (no endpoint or no chat id)");
            return;
        };

        let client = self.client.clone();
        tokio::spawn(async move {
            let body = serde_json::json!({
                "chat_id": chat_id,
                "thread_id": thread_id,
            });
            match client.post(&url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(%url, "backend notified");
                }
                Ok(response) => {
                    warn!(%url, status = %response.status(), "backend notification rejected");
                }
                Err(err) => {
                    warn!(%url, %err, "backend notification error");
                }
            }
        });
    }
}
