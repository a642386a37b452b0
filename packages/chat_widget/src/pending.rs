//! Queue of messages typed before a chat session exists.
//!
//! Strict FIFO: the queued texts become the initial thread content of the
//! start-or-resume command, in typing order. The queue is cleared whether
//! activation succeeds (flushed) or fails (every entry marked failed).

/// A customer message waiting for a session. `local_id` is the widget-side
/// id it was optimistically rendered under.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMessage {
    pub local_id: String,
    pub text: String,
}

#[derive(Debug, Default)]
pub struct PendingQueue {
    messages: Vec<PendingMessage>,
}

impl PendingQueue {
    pub fn push(&mut self, message: PendingMessage) {
        self.messages.push(message);
    }

    /// Take every queued message, oldest first, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<PendingMessage> {
        std::mem::take(&mut self.messages)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingMessage> {
        self.messages.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}
