//! `/v1/jobs*` (spec.md §6/§4.3): asynchronous job creation, polling, and
//! artifact retrieval backed by `JobStore` + `ExecutionEngine`.

use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use autosage_jobs::{JobError, JobRecord, JobStatus};

use crate::api::error_response;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct JobCreateRequest {
    tool_name: String,
    #[serde(default)]
    input: autosage_core::value::StructuredValue,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    wait_ms: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct JobCreateResponse {
    job_id: String,
    status: JobStatus,
    job: Option<JobRecord>,
}

pub async fn create_job(State(state): State<AppState>, Json(req): Json<JobCreateRequest>) -> Response {
    let record = match state.jobs.create(req.tool_name.clone(), Some(&req.input)) {
        Ok(record) => record,
        Err(e) => return error_response(&e),
    };
    let job_id = record.id.clone();
    let sync = req.mode.as_deref() == Some("sync");

    let jobs = state.jobs.clone();
    let engine = state.engine.clone();
    let tool_name = req.tool_name;
    let input = req.input;
    let running_id = job_id.clone();

    let run = async move {
        if let Err(e) = jobs.start(&running_id) {
            tracing::warn!(job_id = %running_id, error = %e, "failed to mark job running");
        }
        let result = engine
            .execute(&tool_name, input, running_id.clone(), None, None, CancellationToken::new())
            .await;
        match result.status {
            autosage_core::execution::ToolStatus::Ok => {
                let summary = result.summary.clone();
                let _ = jobs.complete(&running_id, result, summary);
            }
            autosage_core::execution::ToolStatus::Error => {
                let code = result.error_code().unwrap_or("runtime").to_string();
                let _ = jobs.fail(&running_id, JobError { code, message: result.summary.clone() });
            }
        }
    };

    if sync {
        run.await;
        let snapshot = state.jobs.get(&job_id).unwrap_or(record);
        return (StatusCode::OK, Json(JobCreateResponse { job_id, status: snapshot.status, job: Some(snapshot) }))
            .into_response();
    }

    tokio::spawn(run);

    if let Some(wait_ms) = req.wait_ms {
        tokio::time::sleep(Duration::from_millis(wait_ms)).await;
    }
    let snapshot = state.jobs.get(&job_id).unwrap_or(record);
    (StatusCode::OK, Json(JobCreateResponse { job_id, status: snapshot.status, job: Some(snapshot) })).into_response()
}

pub async fn get_job(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.jobs.get(&id) {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn list_job_artifacts(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.jobs.list_artifacts(&id) {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(&e),
    }
}

pub async fn read_job_artifact(State(state): State<AppState>, Path((id, name)): Path<(String, String)>) -> Response {
    match state.jobs.read_artifact(&id, &name) {
        Ok(bytes) => {
            let mime = autosage_tools::mime::infer(&name);
            ([(header::CONTENT_TYPE, mime)], bytes).into_response()
        }
        Err(e) => error_response(&e),
    }
}
