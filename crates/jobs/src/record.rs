//! `JobRecord` and its lifecycle states (spec.md §3/§4.3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autosage_core::execution::ToolResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobError {
    pub code: String,
    pub message: String,
}

/// The lifecycle record of one asynchronous job: `queued → running →
/// {succeeded, failed}`, with no other transitions permitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: String,
    pub tool_name: String,

    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "crate::timestamp::option")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, with = "crate::timestamp::option")]
    pub finished_at: Option<DateTime<Utc>>,

    pub status: JobStatus,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub result: Option<ToolResult>,
    #[serde(default)]
    pub error: Option<JobError>,
}

impl JobRecord {
    pub fn new(id: String, tool_name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            tool_name,
            created_at,
            started_at: None,
            finished_at: None,
            status: JobStatus::Queued,
            summary: None,
            result: None,
            error: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.status, JobStatus::Succeeded | JobStatus::Failed)
    }
}

/// One enumerated artifact entry as returned by `list_artifacts`.
#[derive(Debug, Clone, Serialize)]
pub struct ArtifactEntry {
    pub name: String,
    pub path: String,
    pub mime_type: String,
    pub bytes: u64,
}
