//! `ExecutionEngine` — the policy layer wrapped around every tool invocation.
//!
//! Mirrors the teacher gateway's `exec_tool`/`process_tool` dispatch
//! (`crates/gateway/src/api/tools.rs`) generalized into the seven-stage
//! pipeline spec.md §4.2 names: resolve, schema-validate, admit, build
//! context, dispatch, normalize, persist.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use autosage_core::execution::{
    Artifact, ExecutionContext, ExecutionLimits, ExecutionLimitsOverride, ToolResult, ToolStatus,
};
use autosage_core::schema::validate;
use autosage_core::value::{OrderedMap, StructuredValue};

use crate::mime;
use crate::registry::ToolRegistry;

/// Maps an in-band `metrics.error_code` to the HTTP status an adapter
/// should answer with (spec.md §4.2/§6). Returns `200` for anything not
/// explicitly listed — most error codes are in-band at 200, per §7.
pub fn http_status_for_error_code(code: &str) -> u16 {
    match code {
        "unknown_tool" => 404,
        "invalid_input" => 400,
        "too_many_requests" => 429,
        "payload_too_large" => 413,
        _ => 200,
    }
}

/// The policy layer: one instance shared across every adapter that needs
/// to run a tool (`/v1/tools/execute`, `/v1/jobs`, the orchestrator).
pub struct ExecutionEngine {
    registry: Arc<ToolRegistry>,
    run_root: PathBuf,
    semaphore: Arc<Semaphore>,
}

impl ExecutionEngine {
    pub fn new(registry: Arc<ToolRegistry>, run_root: PathBuf, concurrency: usize) -> Self {
        Self {
            registry,
            run_root,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one invocation of `tool_name` under `job_id`, allocating its
    /// job directory under the configured run root and persisting
    /// `request.json`/`summary.json`/`result.json` there (the
    /// `/v1/tools/execute` and `/v1/jobs` paths).
    pub async fn execute(
        &self,
        tool_name: &str,
        input: StructuredValue,
        job_id: String,
        request_id: Option<String>,
        limits_override: Option<ExecutionLimitsOverride>,
        cancellation: CancellationToken,
    ) -> ToolResult {
        let job_directory = self.run_root.join(&job_id);
        self.execute_in_directory(
            tool_name,
            input,
            job_id,
            job_directory,
            request_id,
            limits_override,
            cancellation,
            true,
        )
        .await
    }

    /// Run one invocation against a caller-supplied `job_directory`
    /// instead of one allocated under the run root, without writing the
    /// `request.json`/`summary.json`/`result.json` bookkeeping files —
    /// used by the orchestrator, whose tool calls write artifacts
    /// straight into the session workspace's stage subdirectories.
    pub async fn execute_in_session_workspace(
        &self,
        tool_name: &str,
        input: StructuredValue,
        job_id: String,
        job_directory: PathBuf,
        request_id: Option<String>,
        limits_override: Option<ExecutionLimitsOverride>,
        cancellation: CancellationToken,
    ) -> ToolResult {
        self.execute_in_directory(
            tool_name,
            input,
            job_id,
            job_directory,
            request_id,
            limits_override,
            cancellation,
            false,
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_in_directory(
        &self,
        tool_name: &str,
        input: StructuredValue,
        job_id: String,
        job_directory: PathBuf,
        request_id: Option<String>,
        limits_override: Option<ExecutionLimitsOverride>,
        cancellation: CancellationToken,
        persist_job_files: bool,
    ) -> ToolResult {
        // 1. Resolve
        let Some(descriptor) = self.registry.lookup(tool_name).cloned() else {
            warn!(tool = tool_name, "unknown tool requested");
            return ToolResult::error(tool_name, "unknown_tool", format!("no such tool: {tool_name}"));
        };

        // 2. Schema-validate
        if let Err(message) = validate(&descriptor.input_schema, &input) {
            return ToolResult::error(tool_name, "invalid_input", message);
        }

        // 3. Admission
        let Ok(permit) = self.semaphore.clone().try_acquire_owned() else {
            return ToolResult::error(
                tool_name,
                "too_many_requests",
                "no admission slot available",
            );
        };

        // 4. Context
        if let Err(e) = std::fs::create_dir_all(&job_directory) {
            drop(permit);
            return ToolResult::error(tool_name, "runtime", format!("failed to create job directory: {e}"));
        }

        if persist_job_files {
            let request_record = StructuredValue::object([
                ("tool".to_string(), StructuredValue::String(tool_name.to_string())),
                ("input".to_string(), input.clone()),
            ]);
            if let Err(e) = write_json_atomic(&job_directory.join("request.json"), &request_record) {
                warn!(job_id = %job_id, error = %e, "failed to persist request.json");
            }
        }

        let limits = ExecutionLimits::default().merged_with(limits_override);
        let context = ExecutionContext {
            job_id: job_id.clone(),
            job_directory: job_directory.clone(),
            request_id: request_id.clone(),
            limits,
            cancellation: cancellation.clone(),
        };

        // 5. Dispatch, with timeout + panic safety.
        let invoker = descriptor.invoker.clone();
        let dispatch_input = input.clone();
        let dispatch_context = context.clone();
        let join = tokio::task::spawn_blocking(move || {
            std::panic::catch_unwind(AssertUnwindSafe(|| {
                (invoker)(dispatch_input, &dispatch_context)
            }))
        });

        let timeout = Duration::from_millis(context.limits.timeout_ms.max(1));
        let started = Instant::now();
        let raw_result = match tokio::time::timeout(timeout, join).await {
            Ok(Ok(Ok(result))) => result,
            Ok(Ok(Err(panic))) => {
                let message = panic_message(&panic);
                warn!(tool = tool_name, job_id = %job_id, %message, "invoker panicked");
                ToolResult::error(tool_name, "runtime", message)
            }
            Ok(Err(join_error)) => {
                ToolResult::error(tool_name, "runtime", format!("invoker task failed: {join_error}"))
            }
            Err(_elapsed) => {
                cancellation.cancel();
                let mut result = ToolResult::error(
                    tool_name,
                    "timeout",
                    format!("exceeded timeout of {}ms", context.limits.timeout_ms),
                );
                result.metrics.insert(
                    "elapsed_ms",
                    StructuredValue::Number(started.elapsed().as_millis() as f64),
                );
                result
            }
        };
        drop(permit);

        // 6. Normalize
        let normalized = self.normalize(raw_result, &context, request_id.as_deref());

        // 7. Persist
        if persist_job_files {
            if let Err(e) = write_json_atomic(&job_directory.join("result.json"), &normalized) {
                warn!(job_id = %job_id, error = %e, "failed to persist result.json");
            }
            let summary = StructuredValue::object([
                ("status".to_string(), StructuredValue::String(match normalized.status {
                    ToolStatus::Ok => "ok".to_string(),
                    ToolStatus::Error => "error".to_string(),
                })),
                ("summary".to_string(), StructuredValue::String(normalized.summary.clone())),
            ]);
            if let Err(e) = write_json_atomic(&job_directory.join("summary.json"), &summary) {
                warn!(job_id = %job_id, error = %e, "failed to persist summary.json");
            }
        }

        info!(
            tool = tool_name,
            job_id = %job_id,
            status = ?normalized.status,
            "invocation complete"
        );
        normalized
    }

    fn normalize(
        &self,
        mut result: ToolResult,
        context: &ExecutionContext,
        request_id: Option<&str>,
    ) -> ToolResult {
        let limits = &context.limits;

        let stdout_dropped = truncate_bytes(&mut result.stdout, limits.max_stdout_bytes);
        if stdout_dropped > 0 {
            result
                .metrics
                .insert("stdout_truncated_bytes", StructuredValue::Number(stdout_dropped as f64));
        }

        let stderr_dropped = truncate_bytes(&mut result.stderr, limits.max_stderr_bytes);
        if stderr_dropped > 0 {
            result
                .metrics
                .insert("stderr_truncated_bytes", StructuredValue::Number(stderr_dropped as f64));
        }

        if result.summary.chars().count() > limits.max_summary_characters {
            let truncated: String = result
                .summary
                .chars()
                .take(limits.max_summary_characters)
                .collect();
            result.summary = format!("{truncated}… limits: truncated");
        }

        if result.artifacts.len() > limits.max_artifacts {
            let dropped = result.artifacts.len() - limits.max_artifacts;
            result.artifacts.truncate(limits.max_artifacts);
            result
                .metrics
                .insert("artifacts_dropped_count", StructuredValue::Number(dropped as f64));
        }

        let mut rejected = 0u64;
        let mut kept = Vec::with_capacity(result.artifacts.len());
        for artifact in result.artifacts.drain(..) {
            match self.restat_artifact(context, artifact, limits.max_artifact_bytes) {
                Some(artifact) => kept.push(artifact),
                None => rejected += 1,
            }
        }
        result.artifacts = kept;
        if rejected > 0 {
            result
                .metrics
                .insert("artifact_rejected_count", StructuredValue::Number(rejected as f64));
        }

        if let Some(request_id) = request_id {
            result
                .metrics
                .insert("request_id", StructuredValue::String(request_id.to_string()));
        }

        result
    }

    fn restat_artifact(
        &self,
        context: &ExecutionContext,
        mut artifact: Artifact,
        max_artifact_bytes: u64,
    ) -> Option<Artifact> {
        let absolute = context.job_directory.join(&artifact.path);
        let metadata = std::fs::metadata(&absolute).ok()?;
        if !metadata.is_file() {
            return None;
        }
        if metadata.len() > max_artifact_bytes {
            return None;
        }
        artifact.bytes = metadata.len();
        artifact.mime_type = mime::infer(&artifact.name);
        Some(artifact)
    }
}

/// Truncate `s` to at most `cap` bytes (at a char boundary), returning the
/// number of bytes dropped.
fn truncate_bytes(s: &mut String, cap: usize) -> usize {
    if s.len() <= cap {
        return 0;
    }
    let mut boundary = cap;
    while boundary > 0 && !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    let dropped = s.len() - boundary;
    s.truncate(boundary);
    dropped
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "invoker panicked with a non-string payload".to_string()
    }
}

fn write_json_atomic(path: &std::path::Path, value: &StructuredValue) -> std::io::Result<()> {
    let json: serde_json::Value = value.clone().into();
    let pretty = serde_json::to_string_pretty(&json)?;
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, pretty)?;
    std::fs::rename(&tmp_path, path)?;
    Ok(())
}

/// Helper exposed for callers (JobStore, orchestrator) that need an
/// `OrderedMap`-backed metrics bag built ad hoc.
pub fn empty_metrics() -> OrderedMap {
    OrderedMap::new()
}
