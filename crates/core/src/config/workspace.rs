use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Run root / workspace layout
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where job directories and session workspaces are created on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Root directory under which `job_*/` directories are created.
    pub jobs_path: PathBuf,
    /// Root directory under which `session_*/` directories are created.
    pub sessions_path: PathBuf,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            jobs_path: PathBuf::from("./data/jobs"),
            sessions_path: PathBuf::from("./data/sessions"),
        }
    }
}
