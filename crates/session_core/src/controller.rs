use std::sync::Arc;

use chrono::Utc;
use completion::{CompletionService, ServiceError};
use lang_detect::{resolve_language, LanguageGuesser, Resolution};
use shared::{
    domain::HistoryEntry,
    protocol::{ComparisonView, ResolvedLanguage, SessionView},
};
use tracing::{debug, info};

use crate::{
    download::Download,
    prompts::{build_explain_prompt, build_optimize_prompt},
    state::SessionState,
};

pub const REVERTED_MESSAGE: &str = "Reverted to previous version.";
pub const NOTHING_TO_REVERT_MESSAGE: &str = "No previous version to revert to.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertOutcome {
    Reverted { active: HistoryEntry },
    NothingToRevert,
}

impl RevertOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            RevertOutcome::Reverted { .. } => REVERTED_MESSAGE,
            RevertOutcome::NothingToRevert => NOTHING_TO_REVERT_MESSAGE,
        }
    }
}

/// An explanation together with the view it was rendered in.
#[derive(Debug, Clone)]
pub struct ExplanationView {
    pub explanation: String,
    pub view: SessionView,
}

/// Runs session operations against the two external collaborators.
///
/// The controller holds no session data itself; callers pass the session's
/// [`SessionState`] in and must not run two operations on the same state at
/// once.
#[derive(Clone)]
pub struct SessionController {
    completion: Arc<dyn CompletionService>,
    guesser: Arc<dyn LanguageGuesser>,
}

impl SessionController {
    pub fn new(completion: Arc<dyn CompletionService>, guesser: Arc<dyn LanguageGuesser>) -> Self {
        Self {
            completion,
            guesser,
        }
    }

    /// Language of the pending buffer, using the last uploaded file name.
    pub fn resolve_language(&self, state: &SessionState) -> Option<Resolution> {
        resolve_language(
            state.uploaded_file_name(),
            &state.pending_input().text,
            self.guesser.as_ref(),
        )
    }

    /// Cleans `code` and records the result as the newest version.
    ///
    /// Callers skip this for blank code. A failed completion leaves the
    /// history untouched.
    pub async fn optimize(
        &self,
        state: &mut SessionState,
        code: &str,
        language: Option<&str>,
    ) -> Result<String, ServiceError> {
        let prompt = build_optimize_prompt(code, language);
        let cleaned = self.completion.complete(&prompt).await?;

        state.push_history(HistoryEntry {
            original_code: code.to_string(),
            cleaned_code: cleaned.clone(),
            language: language.map(str::to_string),
            created_at: Utc::now(),
        });
        state.show_explanation_only = false;
        info!(
            history_len = state.history().len(),
            language = language.unwrap_or("unresolved"),
            "optimize recorded"
        );
        Ok(cleaned)
    }

    /// Explains `code` without touching history. The returned view is
    /// rendered in explanation-only mode; the flag is cleared again before
    /// this returns, whether or not the completion succeeded.
    pub async fn explain(
        &self,
        state: &mut SessionState,
        code: &str,
        language: Option<&str>,
    ) -> Result<ExplanationView, ServiceError> {
        state.show_explanation_only = true;
        let result = self.explain_in_view(state, code, language).await;
        state.show_explanation_only = false;
        result
    }

    /// Explains the cleaned code of the active version, if there is one.
    /// The comparison view stays visible alongside the explanation.
    pub async fn explain_latest(
        &self,
        state: &mut SessionState,
    ) -> Option<Result<ExplanationView, ServiceError>> {
        let active = state.active()?.clone();
        Some(
            self.explain_in_view(state, &active.cleaned_code, active.language.as_deref())
                .await,
        )
    }

    async fn explain_in_view(
        &self,
        state: &SessionState,
        code: &str,
        language: Option<&str>,
    ) -> Result<ExplanationView, ServiceError> {
        let prompt = build_explain_prompt(code, language);
        let explanation = self.completion.complete(&prompt).await?;
        Ok(ExplanationView {
            view: self.snapshot(state),
            explanation,
        })
    }

    pub fn revert(&self, state: &mut SessionState) -> RevertOutcome {
        match state.pop_history() {
            Some(active) => {
                debug!(history_len = state.history().len(), "reverted");
                RevertOutcome::Reverted { active }
            }
            None => {
                debug!(history_len = state.history().len(), "nothing to revert");
                RevertOutcome::NothingToRevert
            }
        }
    }

    /// Drops all history and the pending buffer, and asks the frontend to
    /// blank its input widget on the next render.
    pub fn clear_all(&self, state: &mut SessionState) {
        state.clear();
        debug!("session cleared");
    }

    pub fn download(&self, state: &SessionState) -> Option<Download> {
        state.active().map(Download::for_entry)
    }

    /// Render snapshot for the frontend. Consumes the input-reset signal.
    pub fn view(&self, state: &mut SessionState) -> SessionView {
        let mut view = self.snapshot(state);
        view.reset_input_widget = state.take_reset_input_widget();
        view
    }

    fn snapshot(&self, state: &SessionState) -> SessionView {
        let pending = state.pending_input();
        let language = match self.resolve_language(state) {
            Some(resolution) => ResolvedLanguage {
                recognized: resolution.is_recognized(),
                language: Some(resolution.as_str().to_string()),
            },
            None => ResolvedLanguage::default(),
        };

        SessionView {
            pending_input: pending.text.clone(),
            input_source: pending.source.clone(),
            uploaded_file_name: state.uploaded_file_name().map(str::to_string),
            language,
            history_len: state.history().len(),
            phase: state.phase(),
            show_explanation_only: state.show_explanation_only(),
            comparison: comparison(state),
            reset_input_widget: state.reset_input_widget(),
        }
    }
}

/// Side-by-side view of the active version. Hidden while an explanation is
/// showing, or when either side is blank.
fn comparison(state: &SessionState) -> Option<ComparisonView> {
    if state.show_explanation_only() {
        return None;
    }
    let active = state.active()?;
    if active.original_code.trim().is_empty() || active.cleaned_code.trim().is_empty() {
        return None;
    }
    Some(ComparisonView {
        original_code: active.original_code.clone(),
        cleaned_code: active.cleaned_code.clone(),
        language: active.language.clone(),
    })
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
