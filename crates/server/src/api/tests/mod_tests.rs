use super::*;
use crate::build_router;
use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use completion::CompletionService;
use lang_detect::KeywordGuesser;
use session_core::SessionController;
use std::sync::Mutex;
use tower::ServiceExt;

/// Echoes a tagged copy of each prompt's last line, or fails when told to.
#[derive(Default)]
struct FakeCompletion {
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

#[async_trait]
impl CompletionService for FakeCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, ServiceError> {
        let mut prompts = self.prompts.lock().expect("prompts");
        prompts.push(prompt.to_string());
        if self.fail {
            return Err(ServiceError::Status {
                status: 429,
                body: "quota exceeded".into(),
            });
        }
        Ok(format!("reply #{}", prompts.len()))
    }
}

fn test_app_with(completion: FakeCompletion, max_upload_bytes: usize) -> Router {
    let controller = SessionController::new(Arc::new(completion), Arc::new(KeywordGuesser::new()));
    build_router(Arc::new(AppState::new(controller, 16, max_upload_bytes)))
}

fn test_app() -> Router {
    test_app_with(FakeCompletion::default(), 1024)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(req).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

async fn new_session(app: &Router) -> String {
    let req = Request::post("/sessions").body(Body::empty()).expect("request");
    let (status, json) = send(app, req).await;
    assert_eq!(status, StatusCode::OK);
    json["session_id"].as_str().expect("session id").to_string()
}

fn put_text(id: &str, text: &str, edited_at: Option<&str>) -> Request<Body> {
    let mut body = serde_json::json!({ "text": text });
    if let Some(at) = edited_at {
        body["edited_at"] = at.into();
    }
    Request::put(format!("/sessions/{id}/input"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn post(path: String) -> Request<Body> {
    Request::post(path).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn healthz_and_index_respond() {
    let app = test_app();
    let response = app
        .clone()
        .oneshot(Request::get("/healthz").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = test_app();
    let req = Request::get(format!("/sessions/{}", SessionId::new()))
        .body(Body::empty())
        .expect("request");
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn older_typed_edit_is_reported_stale() {
    let app = test_app();
    let id = new_session(&app).await;

    let (status, json) = send(&app, put_text(&id, "x = 1", Some("2024-01-01T00:00:10Z"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "applied");

    let (_, json) = send(&app, put_text(&id, "x = 0", Some("2024-01-01T00:00:05Z"))).await;
    assert_eq!(json["status"], "stale");
    assert_eq!(json["view"]["pending_input"], "x = 1");
}

#[tokio::test]
async fn upload_uses_extension_for_language() {
    let app = test_app();
    let id = new_session(&app).await;

    let req = Request::post(format!("/sessions/{id}/upload?filename=script.py"))
        .body(Body::from("const add = (a, b) => a + b;\nconsole.log(add(1, 2));\n"))
        .expect("request");
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["view"]["uploaded_file_name"], "script.py");

    let req = Request::get(format!("/sessions/{id}/language"))
        .body(Body::empty())
        .expect("request");
    let (_, json) = send(&app, req).await;
    assert_eq!(json["language"], "python");
    assert_eq!(json["recognized"], true);
}

#[tokio::test]
async fn oversized_upload_is_rejected_with_413() {
    let app = test_app_with(FakeCompletion::default(), 8);
    let id = new_session(&app).await;

    let req = Request::post(format!("/sessions/{id}/upload?filename=big.py"))
        .body(Body::from("print('this is too long')"))
        .expect("request");
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(json["code"], "payload_too_large");
}

#[tokio::test]
async fn non_utf8_upload_is_rejected() {
    let app = test_app();
    let id = new_session(&app).await;

    let req = Request::post(format!("/sessions/{id}/upload?filename=blob.c"))
        .body(Body::from(vec![0xff, 0xfe, 0x00]))
        .expect("request");
    let (status, json) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
}

#[test]
fn upload_filename_rules() {
    assert_eq!(
        validate_upload("  ", b"x", 10),
        Err(UploadError::MissingFilename)
    );
    assert_eq!(
        validate_upload("../etc/passwd", b"x", 10),
        Err(UploadError::PathInFilename)
    );
    assert_eq!(
        validate_upload(&"a".repeat(200), b"x", 10),
        Err(UploadError::FilenameTooLong)
    );
    assert_eq!(
        validate_upload(" main.rs ", b"fn main() {}", 100),
        Ok(("main.rs".to_string(), "fn main() {}".to_string()))
    );
}

#[tokio::test]
async fn optimize_blank_input_is_a_validation_error() {
    let app = test_app();
    let id = new_session(&app).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/optimize"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
}

#[tokio::test]
async fn optimize_twice_then_revert_restores_first_result() {
    let app = test_app();
    let id = new_session(&app).await;
    send(&app, put_text(&id, "def f():\n    print(1)\n", None)).await;

    let (status, first) = send(&app, post(format!("/sessions/{id}/optimize"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["cleaned_code"], "reply #1");
    assert_eq!(first["view"]["comparison"]["language"], "python");

    let (_, second) = send(&app, post(format!("/sessions/{id}/optimize"))).await;
    assert_eq!(second["view"]["history_len"], 2);

    let (status, reverted) = send(&app, post(format!("/sessions/{id}/revert"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reverted["status"], "reverted");
    assert_eq!(reverted["view"]["history_len"], 1);
    assert_eq!(reverted["view"]["comparison"]["cleaned_code"], "reply #1");
}

#[tokio::test]
async fn revert_without_history_is_a_warning_not_an_error() {
    let app = test_app();
    let id = new_session(&app).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/revert"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "nothing_to_revert");
    assert_eq!(json["message"], "No previous version to revert to.");
    assert_eq!(json["view"]["history_len"], 0);
}

#[tokio::test]
async fn explain_shows_explanation_only_without_touching_history() {
    let app = test_app();
    let id = new_session(&app).await;
    send(&app, put_text(&id, "fn main() { println!(\"hi\"); }", None)).await;
    send(&app, post(format!("/sessions/{id}/optimize"))).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/explain"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["explanation"], "reply #2");
    assert_eq!(json["view"]["show_explanation_only"], true);
    assert!(json["view"].get("comparison").is_none());
    assert_eq!(json["view"]["history_len"], 1);

    let req = Request::get(format!("/sessions/{id}"))
        .body(Body::empty())
        .expect("request");
    let (_, view) = send(&app, req).await;
    assert_eq!(view["show_explanation_only"], false);
}

#[tokio::test]
async fn explain_latest_requires_history() {
    let app = test_app();
    let id = new_session(&app).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/explain_latest"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "validation");
}

#[tokio::test]
async fn completion_failure_maps_to_bad_gateway() {
    let app = test_app_with(
        FakeCompletion {
            fail: true,
            ..FakeCompletion::default()
        },
        1024,
    );
    let id = new_session(&app).await;
    send(&app, put_text(&id, "print(1)", None)).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/optimize"))).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["code"], "upstream");
    assert!(json["message"].as_str().expect("message").contains("429"));

    let req = Request::get(format!("/sessions/{id}"))
        .body(Body::empty())
        .expect("request");
    let (_, view) = send(&app, req).await;
    assert_eq!(view["history_len"], 0);
}

#[tokio::test]
async fn clear_resets_session_and_signals_widget_once() {
    let app = test_app();
    let id = new_session(&app).await;
    send(&app, put_text(&id, "print(1)", None)).await;
    send(&app, post(format!("/sessions/{id}/optimize"))).await;

    let (status, view) = send(&app, post(format!("/sessions/{id}/clear"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["history_len"], 0);
    assert_eq!(view["pending_input"], "");
    assert_eq!(view["reset_input_widget"], true);

    let req = Request::get(format!("/sessions/{id}"))
        .body(Body::empty())
        .expect("request");
    let (_, view) = send(&app, req).await;
    assert_eq!(view["reset_input_widget"], false);
}

#[tokio::test]
async fn download_returns_active_cleaned_code_as_attachment() {
    let app = test_app();
    let id = new_session(&app).await;

    let req = Request::get(format!("/sessions/{id}/download"))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    send(&app, put_text(&id, "def f():\n    print(1)\n", None)).await;
    send(&app, post(format!("/sessions/{id}/optimize"))).await;

    let req = Request::get(format!("/sessions/{id}/download"))
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(req).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/plain; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"optimized_code.python\""
    );
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&bytes[..], b"reply #1");
}

#[tokio::test]
async fn typing_sent_before_a_clear_cannot_restore_cleared_code() {
    let app = test_app();
    let id = new_session(&app).await;
    send(&app, put_text(&id, "secret v1", Some("2024-01-01T00:00:10Z"))).await;
    send(&app, post(format!("/sessions/{id}/clear"))).await;

    let (status, json) = send(
        &app,
        put_text(&id, "secret v1 + more", Some("2024-01-01T00:00:05Z")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "stale");
    assert_eq!(json["view"]["pending_input"], "");
}

#[tokio::test]
async fn explain_latest_keeps_comparison_visible() {
    let app = test_app();
    let id = new_session(&app).await;
    send(&app, put_text(&id, "def f():\n    print(1)\n", None)).await;
    send(&app, post(format!("/sessions/{id}/optimize"))).await;

    let (status, json) = send(&app, post(format!("/sessions/{id}/explain_latest"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["explanation"], "reply #2");
    assert_eq!(json["view"]["show_explanation_only"], false);
    assert_eq!(json["view"]["comparison"]["cleaned_code"], "reply #1");
}
