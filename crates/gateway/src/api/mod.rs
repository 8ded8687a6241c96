//! HTTP surface (spec.md §6): builds the public/protected axum router
//! split, in the teacher's `api/mod.rs` shape — a small set of
//! always-reachable routes, everything else gated behind the optional
//! bearer-token middleware when `server.api_token` is configured.

pub mod auth;
pub mod chat;
pub mod health;
pub mod jobs;
pub mod sessions;
pub mod tools;

use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use tower_http::trace::TraceLayer;

use autosage_core::Error;
use autosage_core::execution::ToolResult;

use crate::state::AppState;

/// Requests bodies above this size are rejected with 413 before any
/// handler runs (spec.md §7 `payload_too_large`).
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/healthz", get(health::healthz))
        .route("/v1/version", get(health::version));

    let protected = Router::new()
        .route("/v1/tools", get(tools::list_tools))
        .route(
            "/v1/tools/execute",
            post(tools::execute_tool).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route(
            "/v1/jobs",
            post(jobs::create_job).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/v1/jobs/:id", get(jobs::get_job))
        .route("/v1/jobs/:id/artifacts", get(jobs::list_job_artifacts))
        .route("/v1/jobs/:id/artifacts/*name", get(jobs::read_job_artifact))
        .route(
            "/v1/sessions",
            post(sessions::create_session).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .route("/v1/sessions/:id", get(sessions::get_session))
        .route("/v1/sessions/:id/chat", post(chat::chat))
        .route("/v1/sessions/:id/assets/*path", get(sessions::read_asset))
        .route_layer(middleware::from_fn_with_state(state, auth::require_api_token));

    public.merge(protected).layer(TraceLayer::new_for_http())
}

/// Render `err` as the ToolResult-shaped 4xx/5xx body spec.md §7 requires
/// for transport-level failures.
pub(crate) fn error_response(err: &Error) -> Response {
    let (status, code) = match err {
        Error::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
        // Path-traversal/symlink-escape attempts surface as 404, not 403,
        // so a probing client can't distinguish "forbidden" from "missing"
        // (spec.md §4.4, §8: "any `..` segment yields 404").
        Error::Forbidden(_) => (StatusCode::NOT_FOUND, "not_found"),
        Error::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
        Error::UnknownTool(_) => (StatusCode::NOT_FOUND, "unknown_tool"),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "runtime"),
    };
    let body = ToolResult::error("unknown", code, err.to_string());
    (status, Json(body)).into_response()
}

/// A one-off ToolResult-shaped error with no underlying `autosage_core::Error`.
pub(crate) fn error_simple(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    (status, Json(ToolResult::error("unknown", code, message))).into_response()
}
