//! History pagination state for the tracked chat.
//!
//! Status moves only along `Inactive -> Loading -> {Done, Inactive}`.
//! `Loading` forbids re-entrant fetches; `Done` means the source reported
//! exhaustion. The cursor is recreated whenever a chat is (re)loaded.

use chat_transport::PageCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryStatus {
    /// More pages may exist and none is being fetched.
    Inactive,
    /// A fetch is in flight.
    Loading,
    /// No further pages exist.
    Done,
}

#[derive(Debug)]
pub struct HistoryCursor {
    status: HistoryStatus,
    cursor: Option<PageCursor>,
}

impl Default for HistoryCursor {
    fn default() -> Self {
        Self {
            status: HistoryStatus::Inactive,
            cursor: None,
        }
    }
}

impl HistoryCursor {
    pub fn status(&self) -> HistoryStatus {
        self.status
    }

    pub fn cursor(&self) -> Option<&PageCursor> {
        self.cursor.as_ref()
    }

    /// Try to enter `Loading`. Returns false (caller must no-op) while a
    /// fetch is in flight or the source is exhausted.
    pub fn begin(&mut self) -> bool {
        match self.status {
            HistoryStatus::Loading | HistoryStatus::Done => false,
            HistoryStatus::Inactive => {
                self.status = HistoryStatus::Loading;
                true
            }
        }
    }

    /// A page arrived. Store the follow-up cursor and either finish or
    /// re-arm for the next page.
    pub fn complete(&mut self, cursor: Option<PageCursor>, done: bool) {
        self.cursor = cursor;
        self.status = if done {
            HistoryStatus::Done
        } else {
            HistoryStatus::Inactive
        };
    }

    /// The fetch failed; re-arm so a later scroll can retry.
    pub fn fail(&mut self) {
        self.status = HistoryStatus::Inactive;
    }

    /// Recreate the cursor for a freshly (re)loaded chat.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A brand-new chat has no history to page through.
    pub fn mark_done(&mut self) {
        self.cursor = None;
        self.status = HistoryStatus::Done;
    }
}

/// How many times the initial history load may be attempted in total.
/// An explicit value rather than nested retry calls, so tests can pin it.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        // One regular attempt plus one retry.
        Self { attempts: 2 }
    }
}
