//! HTTP surface of the code cleaner: session routes plus the embedded page.

pub mod config;

mod api;
mod app_state;
mod page;
mod registry;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use app_state::AppState;

/// Headroom over `max_upload_bytes` so oversized uploads still reach the
/// handler and get a JSON error.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let body_limit = state.max_upload_bytes.saturating_add(BODY_LIMIT_SLACK);
    Router::new()
        .route("/", get(api::index))
        .route("/healthz", get(api::healthz))
        .route("/sessions", post(api::create_session))
        .route("/sessions/:id", get(api::get_session))
        .route("/sessions/:id/input", put(api::put_input))
        .route("/sessions/:id/upload", post(api::upload))
        .route("/sessions/:id/language", get(api::get_language))
        .route("/sessions/:id/optimize", post(api::optimize))
        .route("/sessions/:id/explain", post(api::explain))
        .route("/sessions/:id/explain_latest", post(api::explain_latest))
        .route("/sessions/:id/revert", post(api::revert))
        .route("/sessions/:id/clear", post(api::clear))
        .route("/sessions/:id/download", get(api::download))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
