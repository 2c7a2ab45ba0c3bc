use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use chrono::{DateTime, Utc};
use completion::ServiceError;
use serde::Deserialize;
use session_core::{EditOutcome, InputEdit, RevertOutcome, SessionState};
use shared::{
    domain::SessionId,
    error::{ApiError, ErrorCode},
    protocol::{
        CreateSessionResponse, EditResponse, EditStatus, ExplainResponse, OptimizeResponse,
        ResolvedLanguage, RevertResponse, RevertStatus, SessionView, TypedInputRequest,
    },
};
use thiserror::Error;
use tracing::{info, warn};

use crate::{app_state::AppState, page::INDEX_HTML, registry::SessionSlot};

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

const MAX_FILENAME_BYTES: usize = 180;

#[derive(Debug, Deserialize)]
pub(crate) struct UploadQuery {
    filename: String,
    edited_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum UploadError {
    #[error("upload exceeds {limit} bytes")]
    TooLarge { limit: usize },
    #[error("filename cannot be empty")]
    MissingFilename,
    #[error("filename is too long")]
    FilenameTooLong,
    #[error("filename must not contain path separators")]
    PathInFilename,
    #[error("uploaded file is not valid UTF-8 text")]
    NotUtf8,
}

impl UploadError {
    fn status(&self) -> StatusCode {
        match self {
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> ErrorCode {
        match self {
            UploadError::TooLarge { .. } => ErrorCode::PayloadTooLarge,
            _ => ErrorCode::Validation,
        }
    }
}

impl From<UploadError> for (StatusCode, Json<ApiError>) {
    fn from(error: UploadError) -> Self {
        (error.status(), Json(ApiError::new(error.code(), error.to_string())))
    }
}

/// Checks an uploaded file and returns its trimmed name and text.
pub(crate) fn validate_upload(
    filename: &str,
    body: &[u8],
    limit: usize,
) -> Result<(String, String), UploadError> {
    if body.len() > limit {
        return Err(UploadError::TooLarge { limit });
    }
    let name = filename.trim();
    if name.is_empty() {
        return Err(UploadError::MissingFilename);
    }
    if name.len() > MAX_FILENAME_BYTES {
        return Err(UploadError::FilenameTooLong);
    }
    if name.contains('/') || name.contains('\\') {
        return Err(UploadError::PathInFilename);
    }
    let text = std::str::from_utf8(body).map_err(|_| UploadError::NotUtf8)?;
    Ok((name.to_string(), text.to_string()))
}

fn not_found() -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(ErrorCode::NotFound, "session not found")),
    )
}

fn validation(message: &str) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiError::new(ErrorCode::Validation, message)),
    )
}

fn upstream(session_id: SessionId, error: ServiceError) -> (StatusCode, Json<ApiError>) {
    warn!(%session_id, %error, "completion service failed");
    (
        StatusCode::BAD_GATEWAY,
        Json(ApiError::new(ErrorCode::Upstream, error.to_string())),
    )
}

fn lookup(state: &AppState, id: SessionId) -> ApiResult<Arc<SessionSlot>> {
    state.sessions.get(id).ok_or_else(not_found)
}

/// Pending buffer text, rejected when blank.
fn pending_code(session: &SessionState, action: &str) -> ApiResult<String> {
    let text = &session.pending_input().text;
    if text.trim().is_empty() {
        return Err(validation(&format!("Please enter some code to {action}.")));
    }
    Ok(text.clone())
}

fn edit_response(outcome: EditOutcome, view: SessionView) -> Json<EditResponse> {
    let status = match outcome {
        EditOutcome::Applied => EditStatus::Applied,
        EditOutcome::Stale => EditStatus::Stale,
    };
    Json(EditResponse { status, view })
}

pub(crate) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub(crate) async fn healthz() -> &'static str {
    "ok"
}

pub(crate) async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Json<CreateSessionResponse> {
    let session_id = state.sessions.create();
    info!(%session_id, live_sessions = state.sessions.len(), "session created");
    Json(CreateSessionResponse { session_id })
}

pub(crate) async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    Ok(Json(state.controller.view(&mut session)))
}

pub(crate) async fn put_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(req): Json<TypedInputRequest>,
) -> ApiResult<Json<EditResponse>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    let at = req.edited_at.unwrap_or_else(Utc::now);
    let outcome = session.apply_edit(InputEdit::typed(req.text, at));
    Ok(edit_response(outcome, state.controller.view(&mut session)))
}

pub(crate) async fn upload(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Query(q): Query<UploadQuery>,
    body: Bytes,
) -> ApiResult<Json<EditResponse>> {
    let slot = lookup(&state, id)?;
    let (file_name, text) = validate_upload(&q.filename, &body, state.max_upload_bytes)?;

    let mut session = slot.state.lock().await;
    let at = q.edited_at.unwrap_or_else(Utc::now);
    let outcome = session.apply_edit(InputEdit::uploaded(&file_name, text, at));
    info!(session_id = %id, %file_name, size_bytes = body.len(), "file uploaded");
    Ok(edit_response(outcome, state.controller.view(&mut session)))
}

pub(crate) async fn get_language(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<ResolvedLanguage>> {
    let slot = lookup(&state, id)?;
    let session = slot.state.lock().await;
    let resolved = match state.controller.resolve_language(&session) {
        Some(resolution) => ResolvedLanguage {
            language: Some(resolution.as_str().to_string()),
            recognized: resolution.is_recognized(),
        },
        None => ResolvedLanguage::default(),
    };
    Ok(Json(resolved))
}

pub(crate) async fn optimize(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<OptimizeResponse>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    let code = pending_code(&session, "optimize")?;
    let language = state.controller.resolve_language(&session);

    let cleaned_code = state
        .controller
        .optimize(
            &mut session,
            &code,
            language.as_ref().map(|resolution| resolution.as_str()),
        )
        .await
        .map_err(|e| upstream(id, e))?;
    Ok(Json(OptimizeResponse {
        cleaned_code,
        view: state.controller.view(&mut session),
    }))
}

pub(crate) async fn explain(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<ExplainResponse>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    let code = pending_code(&session, "explain")?;
    let language = state.controller.resolve_language(&session);

    let explained = state
        .controller
        .explain(
            &mut session,
            &code,
            language.as_ref().map(|resolution| resolution.as_str()),
        )
        .await
        .map_err(|e| upstream(id, e))?;
    Ok(Json(ExplainResponse {
        explanation: explained.explanation,
        view: explained.view,
    }))
}

pub(crate) async fn explain_latest(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<ExplainResponse>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    let explained = state
        .controller
        .explain_latest(&mut session)
        .await
        .ok_or_else(|| validation("There is no optimized code to explain yet."))?
        .map_err(|e| upstream(id, e))?;
    Ok(Json(ExplainResponse {
        explanation: explained.explanation,
        view: explained.view,
    }))
}

pub(crate) async fn revert(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<RevertResponse>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    let outcome = state.controller.revert(&mut session);
    let status = match outcome {
        RevertOutcome::Reverted { .. } => RevertStatus::Reverted,
        RevertOutcome::NothingToRevert => RevertStatus::NothingToRevert,
    };
    Ok(Json(RevertResponse {
        status,
        message: outcome.message().to_string(),
        view: state.controller.view(&mut session),
    }))
}

pub(crate) async fn clear(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<Json<SessionView>> {
    let slot = lookup(&state, id)?;
    let mut session = slot.state.lock().await;
    state.controller.clear_all(&mut session);
    Ok(Json(state.controller.view(&mut session)))
}

pub(crate) async fn download(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> ApiResult<impl IntoResponse> {
    let slot = lookup(&state, id)?;
    let session = slot.state.lock().await;
    let file = state.controller.download(&session).ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ApiError::new(
                ErrorCode::NotFound,
                "no optimized code to download",
            )),
        )
    })?;

    let mut headers = HeaderMap::new();
    let content_type = format!("{}; charset=utf-8", file.content_type);
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("text/plain")),
    );
    if let Ok(value) =
        HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file.file_name))
    {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok((StatusCode::OK, headers, file.body))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
