use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use completion::GeminiClient;
use lang_detect::KeywordGuesser;
use server::{build_router, config::load_settings, AppState};
use session_core::SessionController;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    if settings.gemini_api_key.is_none() {
        warn!("no Gemini API key configured; optimize and explain will fail until one is set");
    }

    let completion = GeminiClient::new(settings.gemini_config());
    info!(model = completion.model(), "completion service configured");
    let controller = SessionController::new(Arc::new(completion), Arc::new(KeywordGuesser::new()));
    let state = AppState::new(controller, settings.max_sessions, settings.max_upload_bytes);
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings
        .server_bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", settings.server_bind))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
