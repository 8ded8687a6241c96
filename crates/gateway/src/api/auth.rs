//! Optional bearer-token gate (SPEC_FULL.md §1: multi-tenant auth is a
//! Non-goal, but a single shared token still guards the protected routes
//! when `server.api_token` is configured — mirrors the teacher's
//! `require_api_token` middleware at a much smaller scale).

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::Response;

use crate::api::error_simple;
use crate::state::AppState;

pub async fn require_api_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(expected) = &state.config.server.api_token else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match provided {
        Some(token) if token == expected => next.run(request).await,
        _ => error_simple(StatusCode::FORBIDDEN, "forbidden", "missing or invalid bearer token"),
    }
}
