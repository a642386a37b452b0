//! Model of the visible message list.
//!
//! Every entry carries a stable id (the server event id, or the local id
//! for optimistically rendered messages) and insertion is idempotent:
//! replaying an event never creates a duplicate visible entry. That holds
//! on the append path as well as the history-merge path — resume replays
//! the live thread on top of freshly loaded history.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use chat_transport::{Role, User};

/// One rendered message.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub id: String,
    pub text: String,
    pub role: Role,
    pub author: Option<User>,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
    ids: HashSet<String>,
}

impl Transcript {
    /// Append one entry. Returns false (and changes nothing) when an entry
    /// with the same id is already visible.
    pub fn append(&mut self, entry: TranscriptEntry) -> bool {
        if !self.ids.insert(entry.id.clone()) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Prepend a batch of (older) entries, keeping their relative order.
    /// Returns the entries actually inserted, so the view only receives
    /// what is new.
    pub fn prepend_batch(&mut self, batch: Vec<TranscriptEntry>) -> Vec<TranscriptEntry> {
        let fresh: Vec<TranscriptEntry> = batch
            .into_iter()
            .filter(|entry| self.ids.insert(entry.id.clone()))
            .collect();
        if !fresh.is_empty() {
            self.entries.splice(0..0, fresh.iter().cloned());
        }
        fresh
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str) -> TranscriptEntry {
        TranscriptEntry {
            id: id.to_string(),
            text: text.to_string(),
            role: Role::Customer,
            author: None,
            at: Utc::now(),
        }
    }

    #[test]
    fn append_rejects_duplicate_ids() {
        let mut transcript = Transcript::default();
        assert!(transcript.append(entry("e-1", "hello")));
        assert!(!transcript.append(entry("e-1", "hello again")));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.entries()[0].text, "hello");
    }

    #[test]
    fn prepend_keeps_batch_order_before_existing_entries() {
        let mut transcript = Transcript::default();
        transcript.append(entry("e-3", "newest"));

        let inserted =
            transcript.prepend_batch(vec![entry("e-1", "oldest"), entry("e-2", "older")]);
        assert_eq!(inserted.len(), 2);

        let ids: Vec<&str> = transcript.entries().iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e-1", "e-2", "e-3"]);
    }

    #[test]
    fn prepend_skips_already_visible_ids() {
        let mut transcript = Transcript::default();
        transcript.append(entry("e-2", "live copy"));

        let inserted =
            transcript.prepend_batch(vec![entry("e-1", "history"), entry("e-2", "history copy")]);
        let ids: Vec<&str> = inserted.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["e-1"]);
        assert_eq!(transcript.len(), 2);
    }

    #[test]
    fn clear_forgets_ids() {
        let mut transcript = Transcript::default();
        transcript.append(entry("e-1", "hello"));
        transcript.clear();
        assert!(transcript.is_empty());
        assert!(transcript.append(entry("e-1", "fresh start")));
    }

    #[test]
    fn contains_sees_both_paths() {
        let mut transcript = Transcript::default();
        transcript.append(entry("e-1", "a"));
        transcript.prepend_batch(vec![entry("e-0", "b")]);
        assert!(transcript.contains("e-0"));
        assert!(transcript.contains("e-1"));
        assert!(!transcript.contains("e-2"));
    }
}
