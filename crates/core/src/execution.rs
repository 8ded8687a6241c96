//! Types around a single tool invocation: context, limits, and the
//! canonical in-band result shape every invocation produces.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::value::StructuredValue;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Limits
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Per-invocation resource caps. Every field has a documented default and
/// may be overridden per request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionLimits {
    pub timeout_ms: u64,
    pub max_stdout_bytes: usize,
    pub max_stderr_bytes: usize,
    pub max_artifact_bytes: u64,
    pub max_artifacts: usize,
    pub max_summary_characters: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_stdout_bytes: 64 * 1024,
            max_stderr_bytes: 16 * 1024,
            max_artifact_bytes: 64 * 1024 * 1024,
            max_artifacts: 32,
            max_summary_characters: 500,
        }
    }
}

impl ExecutionLimits {
    /// Merge request-supplied overrides on top of these defaults; only
    /// explicitly-set fields in `overrides` take effect.
    pub fn merged_with(self, overrides: Option<ExecutionLimitsOverride>) -> Self {
        let Some(o) = overrides else { return self };
        Self {
            timeout_ms: o.timeout_ms.unwrap_or(self.timeout_ms),
            max_stdout_bytes: o.max_stdout_bytes.unwrap_or(self.max_stdout_bytes),
            max_stderr_bytes: o.max_stderr_bytes.unwrap_or(self.max_stderr_bytes),
            max_artifact_bytes: o.max_artifact_bytes.unwrap_or(self.max_artifact_bytes),
            max_artifacts: o.max_artifacts.unwrap_or(self.max_artifacts),
            max_summary_characters: o
                .max_summary_characters
                .unwrap_or(self.max_summary_characters),
        }
    }
}

/// Partial limits as supplied in a request body's `context.limits`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecutionLimitsOverride {
    pub timeout_ms: Option<u64>,
    pub max_stdout_bytes: Option<usize>,
    pub max_stderr_bytes: Option<usize>,
    pub max_artifact_bytes: Option<u64>,
    pub max_artifacts: Option<usize>,
    pub max_summary_characters: Option<usize>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Context
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything an invoker needs to do its work and nothing more: its own
/// scratch directory, the merged limits, and a cancellation signal.
#[derive(Clone)]
pub struct ExecutionContext {
    pub job_id: String,
    pub job_directory: PathBuf,
    pub request_id: Option<String>,
    pub limits: ExecutionLimits,
    pub cancellation: CancellationToken,
}

impl ExecutionContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Ok,
    Error,
}

/// A produced (not yet re-stat'd) artifact, as returned by an invoker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub name: String,
    /// Path relative to the job directory, e.g. `geometry/primitives.json`.
    pub path: String,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default)]
    pub bytes: u64,
}

/// The canonical in-band result of any tool invocation, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub status: ToolStatus,
    pub solver: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub exit_code: i32,
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
    #[serde(default)]
    pub metrics: crate::value::OrderedMap,
    #[serde(default)]
    pub output: StructuredValue,
}

impl ToolResult {
    pub fn ok(solver: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Ok,
            solver: solver.into(),
            summary: String::new(),
            stdout: String::new(),
            stderr: String::new(),
            exit_code: 0,
            artifacts: Vec::new(),
            metrics: crate::value::OrderedMap::new(),
            output: StructuredValue::Null,
        }
    }

    pub fn error(solver: impl Into<String>, code: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut metrics = crate::value::OrderedMap::new();
        metrics.insert("error_code", StructuredValue::String(code.to_string()));
        Self {
            status: ToolStatus::Error,
            solver: solver.into(),
            summary: message.clone(),
            stdout: String::new(),
            stderr: message,
            exit_code: 1,
            artifacts: Vec::new(),
            metrics,
            output: StructuredValue::Null,
        }
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn with_output(mut self, output: StructuredValue) -> Self {
        self.output = output;
        self
    }

    pub fn with_artifact(mut self, artifact: Artifact) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn error_code(&self) -> Option<&str> {
        self.metrics.get("error_code").and_then(|v| v.as_str())
    }
}

/// Shareable handle form (for runtime's cloning needs, e.g. orchestrator
/// event payloads that carry a `ToolResult` by value).
pub type SharedToolResult = Arc<ToolResult>;
