use super::*;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use tokio::{net::TcpListener, sync::Mutex};

#[derive(Clone, Default)]
struct Captured {
    inner: Arc<Mutex<Option<(Option<String>, serde_json::Value)>>>,
}

async fn spawn_server(status: StatusCode, reply: serde_json::Value) -> (String, Captured) {
    let captured = Captured::default();
    let app = Router::new()
        .route(
            "/v1beta/models/:model_action",
            post(
                move |State(captured): State<Captured>,
                      headers: HeaderMap,
                      Json(body): Json<serde_json::Value>| {
                    let reply = reply.clone();
                    async move {
                        let key = headers
                            .get(API_KEY_HEADER)
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        *captured.inner.lock().await = Some((key, body));
                        (status, Json(reply))
                    }
                },
            ),
        )
        .with_state(captured.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}"), captured)
}

fn client(base_url: String, api_key: Option<&str>) -> GeminiClient {
    GeminiClient::new(GeminiConfig {
        api_key: api_key.map(str::to_string),
        base_url,
        ..GeminiConfig::default()
    })
}

#[tokio::test]
async fn sends_prompt_and_returns_candidate_text() {
    let reply = serde_json::json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": "clean code" }] } }]
    });
    let (base_url, captured) = spawn_server(StatusCode::OK, reply).await;

    let text = client(base_url, Some("secret"))
        .complete("tidy this")
        .await
        .expect("completion");
    assert_eq!(text, "clean code");

    let (key, body) = captured.inner.lock().await.clone().expect("request seen");
    assert_eq!(key.as_deref(), Some("secret"));
    assert_eq!(body["contents"][0]["parts"][0]["text"], "tidy this");
    assert_eq!(body["contents"][0]["role"], "user");
    assert!(body["generationConfig"]["temperature"].as_f64().is_some());
}

#[tokio::test]
async fn non_success_status_is_surfaced_with_body() {
    let reply = serde_json::json!({ "error": { "message": "quota exceeded" } });
    let (base_url, _captured) = spawn_server(StatusCode::TOO_MANY_REQUESTS, reply).await;

    let err = client(base_url, Some("secret"))
        .complete("tidy this")
        .await
        .expect_err("should fail");
    match err {
        ServiceError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("quota exceeded"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let err = client("http://127.0.0.1:9".into(), None)
        .complete("tidy this")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ServiceError::MissingApiKey));

    let err = client("http://127.0.0.1:9".into(), Some(""))
        .complete("tidy this")
        .await
        .expect_err("should fail");
    assert!(matches!(err, ServiceError::MissingApiKey));
}

#[test]
fn endpoint_targets_configured_model() {
    let client = GeminiClient::new(GeminiConfig {
        model: "gemini-test".into(),
        ..GeminiConfig::default()
    });
    let url = client.endpoint().expect("url");
    assert_eq!(
        url.as_str(),
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-test:generateContent"
    );
}
