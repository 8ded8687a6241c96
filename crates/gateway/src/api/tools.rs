//! `GET /v1/tools` and `POST /v1/tools/execute` (spec.md §6).

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use autosage_core::execution::{ExecutionLimitsOverride, ToolResult, ToolStatus};
use autosage_core::tool::{Stability, ToolFilter, ToolSummary};
use autosage_core::value::StructuredValue;
use autosage_tools::http_status_for_error_code;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ToolsQuery {
    stability: Option<String>,
    tags: Option<String>,
}

pub async fn list_tools(State(state): State<AppState>, Query(query): Query<ToolsQuery>) -> Json<Vec<ToolSummary>> {
    let filter = ToolFilter {
        stability: query.stability.as_deref().and_then(parse_stability),
        tags: query
            .tags
            .map(|raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
    };

    let summaries: Vec<ToolSummary> = state.registry.list(&filter).into_iter().map(ToolSummary::from).collect();
    Json(summaries)
}

fn parse_stability(raw: &str) -> Option<Stability> {
    match raw {
        "stable" => Some(Stability::Stable),
        "experimental" => Some(Stability::Experimental),
        "deprecated" => Some(Stability::Deprecated),
        _ => None,
    }
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    tool: String,
    #[serde(default)]
    input: StructuredValue,
    #[serde(default)]
    context: Option<ExecuteContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecuteContext {
    limits: Option<ExecutionLimitsOverride>,
}

/// Synchronous tool invocation. Always responds with a ToolResult body,
/// in-band or transport-level (spec.md §7).
pub async fn execute_tool(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
    body: Result<Json<ExecuteRequest>, JsonRejection>,
) -> Response {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            let result = ToolResult::error("unknown", "invalid_request", rejection.body_text());
            return with_request_id((StatusCode::BAD_REQUEST, Json(result)).into_response(), request_id.as_deref());
        }
    };

    // `job_NNNN`, not `call_NNNN`: ExecutionContext.job_id always follows
    // the job directory naming convention (spec.md §3), so this reserves
    // from the same counter `JobStore` uses for `/v1/jobs` to avoid
    // colliding job directories under the shared run root.
    let job_id = state.jobs.reserve_id();
    let limits_override = req.context.and_then(|c| c.limits);
    let result = state
        .engine
        .execute(&req.tool, req.input, job_id, request_id.clone(), limits_override, CancellationToken::new())
        .await;

    let status = match result.status {
        ToolStatus::Ok => StatusCode::OK,
        ToolStatus::Error => StatusCode::from_u16(http_status_for_error_code(result.error_code().unwrap_or("")))
            .unwrap_or(StatusCode::OK),
    };

    with_request_id((status, Json(result)).into_response(), request_id.as_deref())
}

fn with_request_id(mut response: Response, request_id: Option<&str>) -> Response {
    if let Some(id) = request_id {
        if let Ok(value) = HeaderValue::from_str(id) {
            response.headers_mut().insert("x-request-id", value);
        }
    }
    response
}
