use chrono::{DateTime, Utc};
use shared::domain::{HistoryEntry, InputSource, SessionPhase};

/// The live, editable code buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingInput {
    pub text: String,
    pub source: Option<InputSource>,
    pub edited_at: Option<DateTime<Utc>>,
}

/// A change to the pending buffer, either typed or from a file upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEdit {
    pub text: String,
    pub source: InputSource,
    pub at: DateTime<Utc>,
}

impl InputEdit {
    pub fn typed(text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            source: InputSource::Typed,
            at,
        }
    }

    pub fn uploaded(file_name: impl Into<String>, text: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            text: text.into(),
            source: InputSource::Uploaded {
                file_name: file_name.into(),
            },
            at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Applied,
    /// The edit predates the current buffer and was dropped.
    Stale,
}

/// State owned by one browser session.
///
/// `history` is append-only apart from revert (pop) and clear-all; its last
/// element is the version currently on display.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    history: Vec<HistoryEntry>,
    pending_input: PendingInput,
    uploaded_file_name: Option<String>,
    pub(crate) show_explanation_only: bool,
    reset_input_widget: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn active(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }

    pub fn pending_input(&self) -> &PendingInput {
        &self.pending_input
    }

    pub fn uploaded_file_name(&self) -> Option<&str> {
        self.uploaded_file_name.as_deref()
    }

    pub fn show_explanation_only(&self) -> bool {
        self.show_explanation_only
    }

    pub fn reset_input_widget(&self) -> bool {
        self.reset_input_widget
    }

    pub fn phase(&self) -> SessionPhase {
        if self.show_explanation_only {
            SessionPhase::ShowingExplanation
        } else if self.history.is_empty() {
            SessionPhase::Empty
        } else {
            SessionPhase::HasHistory
        }
    }

    /// Applies `edit` unless the buffer already holds a newer one. Ties go
    /// to the incoming edit.
    ///
    /// An upload also becomes the file name used for extension lookup; typing
    /// afterwards replaces the text but keeps that name.
    pub fn apply_edit(&mut self, edit: InputEdit) -> EditOutcome {
        if let Some(current) = self.pending_input.edited_at {
            if edit.at < current {
                return EditOutcome::Stale;
            }
        }

        if let InputSource::Uploaded { file_name } = &edit.source {
            self.uploaded_file_name = Some(file_name.clone());
        }
        self.pending_input = PendingInput {
            text: edit.text,
            source: Some(edit.source),
            edited_at: Some(edit.at),
        };
        EditOutcome::Applied
    }

    pub(crate) fn push_history(&mut self, entry: HistoryEntry) {
        self.history.push(entry);
    }

    /// Pops the newest entry when an older one remains to fall back to.
    pub(crate) fn pop_history(&mut self) -> Option<HistoryEntry> {
        if self.history.len() <= 1 {
            return None;
        }
        self.history.pop();
        self.history.last().cloned()
    }

    /// Empties the session. The buffer keeps its last edit time as a
    /// watermark, so edits made before the clear stay `Stale`.
    pub(crate) fn clear(&mut self) {
        self.history.clear();
        self.pending_input = PendingInput {
            edited_at: self.pending_input.edited_at,
            ..PendingInput::default()
        };
        self.uploaded_file_name = None;
        self.show_explanation_only = false;
        self.reset_input_widget = true;
    }

    /// Returns and clears the one-shot "blank the input widget" signal.
    pub(crate) fn take_reset_input_widget(&mut self) -> bool {
        std::mem::take(&mut self.reset_input_widget)
    }
}

#[cfg(test)]
#[path = "tests/state_tests.rs"]
mod tests;
