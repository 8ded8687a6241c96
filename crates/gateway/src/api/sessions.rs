//! `/v1/sessions*` (spec.md §6/§4.4): create-from-upload, manifest
//! snapshot, and traversal-defended asset retrieval.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use autosage_sessions::SessionManifest;

use crate::api::{error_response, error_simple};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SessionCreateResponse {
    session_id: String,
    state: SessionManifest,
}

pub async fn create_session(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return error_simple(StatusCode::BAD_REQUEST, "invalid_request", "missing `file` field"),
            Err(e) => return error_simple(StatusCode::BAD_REQUEST, "invalid_request", e.to_string()),
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = match field.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => return error_simple(StatusCode::BAD_REQUEST, "invalid_request", e.to_string()),
        };

        return match state.sessions.create_from_upload(&filename, &bytes) {
            Ok(manifest) => {
                (StatusCode::OK, Json(SessionCreateResponse { session_id: manifest.session_id.clone(), state: manifest }))
                    .into_response()
            }
            Err(e) => error_response(&e),
        };
    }
}

pub async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.sessions.get(&id) {
        Ok(manifest) => Json(manifest).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn read_asset(State(state): State<AppState>, Path((id, path)): Path<(String, String)>) -> Response {
    match state.sessions.asset_reader(&id, &path) {
        Ok(bytes) => {
            let mime = autosage_tools::mime::infer(&path);
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(e) => error_response(&e),
    }
}

