//! `POST /v1/sessions/{id}/chat?stream=true` (spec.md §4.5/§6): drives one
//! `StreamingOrchestrator` turn and narrates it as SSE, grounded in the
//! teacher's `api/chat.rs::make_sse_stream`.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use axum::Json;
use parking_lot::Mutex;
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::api::error_simple;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    prompt: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatQuery {
    stream: Option<bool>,
}

/// Cancels the orchestrator turn when the SSE response stream is dropped
/// (client disconnect) — held for the stream's lifetime, same trick the
/// teacher uses with its `_permit: OwnedSemaphorePermit`.
struct CancelOnDrop(CancellationToken);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// Frees a session for its next turn when the stream ends or is dropped.
struct BusyGuard {
    busy: Arc<Mutex<HashSet<String>>>,
    session_id: String,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.busy.lock().remove(&self.session_id);
    }
}

pub async fn chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ChatQuery>,
    Json(req): Json<ChatRequest>,
) -> Response {
    if query.stream != Some(true) {
        return error_simple(StatusCode::BAD_REQUEST, "invalid_request", "chat requires ?stream=true");
    }
    if state.sessions.get(&id).is_err() {
        return error_simple(StatusCode::NOT_FOUND, "not_found", format!("no such session: {id}"));
    }

    {
        let mut busy = state.busy_sessions.lock();
        if !busy.insert(id.clone()) {
            return error_simple(
                StatusCode::TOO_MANY_REQUESTS,
                "too_many_requests",
                "a turn is already in flight for this session",
            );
        }
    }

    let (tx, mut rx) = mpsc::channel(16);
    let cancellation = CancellationToken::new();
    let orchestrator = state.orchestrator.clone();
    let session_id = id.clone();
    let run_cancellation = cancellation.clone();
    tokio::spawn(async move {
        orchestrator.run_turn(&session_id, &req.prompt, tx, run_cancellation).await;
    });

    let busy_guard = BusyGuard { busy: state.busy_sessions.clone(), session_id: id };
    let cancel_guard = CancelOnDrop(cancellation);

    let stream = async_stream::stream! {
        let _busy_guard = busy_guard;
        let _cancel_guard = cancel_guard;
        while let Some(event) = rx.recv().await {
            let name = event.name();
            let data = serde_json::to_string(&event).unwrap_or_default();
            yield Ok::<Event, std::convert::Infallible>(Event::default().event(name).data(data));
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default()).into_response()
}
