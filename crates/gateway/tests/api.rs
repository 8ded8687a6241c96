//! End-to-end HTTP surface tests (spec.md §6/§8), driven through the
//! router directly via `tower::ServiceExt::oneshot` — no real socket.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use autosage_core::config::{Config, WorkspaceConfig};
use autosage_gateway::api;
use autosage_gateway::state::AppState;

fn test_config(dir: &std::path::Path) -> Config {
    Config {
        workspace: WorkspaceConfig {
            jobs_path: dir.join("jobs"),
            sessions_path: dir.join("sessions"),
        },
        ..Config::default()
    }
}

fn build_app(dir: &std::path::Path) -> axum::Router {
    let config = Arc::new(test_config(dir));
    let state = AppState::build(config).unwrap();
    api::router(state.clone()).with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn version_reports_crate_version() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/v1/version").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn list_tools_is_sorted_and_filterable() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/v1/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let names: Vec<&str> = body.as_array().unwrap().iter().map(|t| t["name"].as_str().unwrap()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"echo_json"));
}

#[tokio::test]
async fn execute_known_tool_returns_ok_result() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let request_body = json!({"tool": "echo_json", "input": {"message": "hi", "n": 2}});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tools/execute")
                .header("content-type", "application/json")
                .header("x-request-id", "req-test-1")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("x-request-id").unwrap(), "req-test-1");
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["metrics"]["request_id"], "req-test-1");
}

#[tokio::test]
async fn execute_unknown_tool_returns_404_in_band() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let request_body = json!({"tool": "does.not.exist", "input": {}});
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/tools/execute")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["metrics"]["error_code"], "unknown_tool");
}

#[tokio::test]
async fn create_sync_job_runs_and_completes() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let request_body = json!({
        "tool_name": "echo_json",
        "input": {"message": "hello"},
        "mode": "sync",
    });
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/jobs")
                .header("content-type", "application/json")
                .body(Body::from(request_body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "succeeded");
    let job_id = body["job_id"].as_str().unwrap().to_string();

    let poll = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/jobs/{job_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(poll.status(), StatusCode::OK);
    let polled = body_json(poll).await;
    assert_eq!(polled["status"], "succeeded");
}

#[tokio::test]
async fn unknown_job_id_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(Request::builder().uri("/v1/jobs/job_9999").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_session_via_multipart_then_fetch_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let boundary = "AutoSageTestBoundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"file\"; filename=\"cube.obj\"\r\n");
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(b"v 0 0 0\nv 1 0 0\nv 0 1 0\n");
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = body_json(response).await;
    let session_id = created["session_id"].as_str().unwrap().to_string();
    assert!(created["state"]["assets"]
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a.as_str() == Some("input/cube.obj")));

    let fetched = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{session_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    let manifest = body_json(fetched).await;
    assert_eq!(manifest["session_id"], session_id);

    let traversal = app
        .oneshot(
            Request::builder()
                .uri(format!("/v1/sessions/{session_id}/assets/..%2Fmanifest.json"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(traversal.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn chat_without_stream_query_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions/session_0001/chat")
                .header("content-type", "application/json")
                .body(Body::from(json!({"prompt": "hi"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn chat_on_missing_session_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions/session_9999/chat?stream=true")
                .header("content-type", "application/json")
                .body(Body::from(json!({"prompt": "hi"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bearer_token_guards_protected_routes_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.api_token = Some("s3cret".to_string());
    let state = AppState::build(Arc::new(config)).unwrap();
    let app = api::router(state.clone()).with_state(state);

    let denied = app
        .clone()
        .oneshot(Request::builder().uri("/v1/tools").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(denied.status(), StatusCode::FORBIDDEN);

    let allowed = app
        .oneshot(
            Request::builder()
                .uri("/v1/tools")
                .header("authorization", "Bearer s3cret")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(allowed.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_stream_reaches_agent_done_and_persists_assets() {
    let dir = tempfile::tempdir().unwrap();
    let app = build_app(dir.path());

    let boundary = "AutoSageTestBoundary";
    let mut upload_body = Vec::new();
    upload_body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    upload_body.extend_from_slice(b"Content-Disposition: form-data; name=\"file\"; filename=\"cube.obj\"\r\n");
    upload_body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    upload_body.extend_from_slice(b"v 0 0 0\n");
    upload_body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    let created = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/v1/sessions")
                .header("content-type", format!("multipart/form-data; boundary={boundary}"))
                .body(Body::from(upload_body))
                .unwrap(),
        )
        .await
        .unwrap();
    let created = body_json(created).await;
    let session_id = created["session_id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/v1/sessions/{session_id}/chat?stream=true"))
                .header("content-type", "application/json")
                .body(Body::from(json!({"prompt": "please fit primitives"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("content-type").unwrap(), "text/event-stream");

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();

    for name in ["text_delta", "tool_call_start", "state_update", "tool_call_complete", "agent_done"] {
        assert!(text.contains(&format!("event: {name}")), "missing event {name} in:\n{text}");
    }
    assert!(text.contains("geometry/primitives.json"));
    assert!(dir.path().join("sessions").join(&session_id).join("geometry/primitives.json").exists());
}

#[tokio::test]
async fn healthz_is_reachable_without_a_bearer_token() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(dir.path());
    config.server.api_token = Some("s3cret".to_string());
    let state = AppState::build(Arc::new(config)).unwrap();
    let app = api::router(state.clone()).with_state(state);

    let response = app
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
