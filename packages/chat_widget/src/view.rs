//! Instructions for the presentation layer.
//!
//! The reconciler never touches widgets; it emits [`ViewCommand`]s over a
//! channel and whatever renders them (DOM shim, TUI, test harness) applies
//! them in order. The commands mirror the widget's actual surface: a
//! composer, a pre-chat prompt, a transcript, a resume affordance, and a
//! couple of indicators.

use tokio::sync::mpsc;
use tracing::debug;

use crate::transcript::TranscriptEntry;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewCommand {
    /// Composer visible and accepting input.
    EnableComposer,
    /// Composer visible but locked, with a placeholder explaining why.
    DisableComposer { reason: String },
    /// Composer removed entirely (end-of-chat prompt takes its place).
    HideComposer,
    /// Show the pre-chat prompt; hides the transcript and composer.
    /// `resume` selects the "Resume chat" wording over "Let's chat".
    ShowPreChat { resume: bool },
    HidePreChat,
    /// Show the transcript and composer area.
    ShowChatView,
    ShowResumeControl { caption: String },
    HideResumeControl,
    AppendMessage(TranscriptEntry),
    /// Older messages to insert above the current transcript. The view
    /// must keep the visual distance from the bottom unchanged — see
    /// [`offset_preserving_bottom_distance`].
    PrependHistory(Vec<TranscriptEntry>),
    ClearTranscript,
    ShowTyping,
    HideTyping,
    ShowProcessing,
    HideProcessing,
    SystemNotice(String),
    MarkSent { id: String },
    MarkFailed { id: String },
}

/// Sending half of the view channel. Emitting never fails: a dropped
/// receiver (widget torn down mid-flight) is logged and ignored.
#[derive(Debug, Clone)]
pub struct ViewSink {
    tx: mpsc::UnboundedSender<ViewCommand>,
}

impl ViewSink {
    pub fn new(tx: mpsc::UnboundedSender<ViewCommand>) -> Self {
        Self { tx }
    }

    /// Convenience constructor for a fresh sink/receiver pair.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ViewCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    pub fn emit(&self, command: ViewCommand) {
        if self.tx.send(command).is_err() {
            debug!("view receiver dropped; discarding instruction");
        }
    }

    pub fn notice(&self, text: impl Into<String>) {
        self.emit(ViewCommand::SystemNotice(text.into()));
    }
}

/// Scroll measurements of the transcript viewport, in whatever length unit
/// the presentation layer uses (pixels, rows).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    /// Total height of the transcript content.
    pub content_height: f64,
    /// Current scroll offset from the top.
    pub offset: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

/// Scroll offset to apply after a history prepend so the user keeps
/// looking at the same messages: the distance from the bottom of the
/// content to the bottom of the viewport is preserved exactly.
pub fn offset_preserving_bottom_distance(before: ScrollMetrics, new_content_height: f64) -> f64 {
    // Content shorter than the viewport measures negative; treat it as
    // sitting at the bottom.
    let from_bottom =
        (before.content_height - (before.offset + before.viewport_height)).max(0.0);
    (new_content_height - before.viewport_height - from_bottom).max(0.0)
}
