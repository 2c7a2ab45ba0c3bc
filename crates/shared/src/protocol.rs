use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{InputSource, SessionId, SessionPhase};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: SessionId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypedInputRequest {
    pub text: String,
    /// Client-side edit time. The server clock is used when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditStatus {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResolvedLanguage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// False for best-effort guesses outside the recognized tag set.
    pub recognized: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonView {
    pub original_code: String,
    pub cleaned_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionView {
    pub pending_input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_source: Option<InputSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_file_name: Option<String>,
    pub language: ResolvedLanguage,
    pub history_len: usize,
    pub phase: SessionPhase,
    pub show_explanation_only: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<ComparisonView>,
    pub reset_input_widget: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditResponse {
    pub status: EditStatus,
    pub view: SessionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizeResponse {
    pub cleaned_code: String,
    pub view: SessionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainResponse {
    pub explanation: String,
    pub view: SessionView,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertStatus {
    Reverted,
    NothingToRevert,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertResponse {
    pub status: RevertStatus,
    pub message: String,
    pub view: SessionView,
}
