//! `SessionManifest` — the persisted authoritative document describing a
//! session's state at a point in time (spec.md §3/§4.4).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autosage_core::value::{OrderedMap, StructuredValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Idle,
    Processing,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// The fixed subdirectories every session workspace carries.
pub const SESSION_SUBDIRECTORIES: [&str; 6] = ["input", "geometry", "mesh", "solve", "render", "logs"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionManifest {
    pub session_id: String,
    pub status: SessionStatus,
    pub stage: String,
    #[serde(default)]
    pub planned_tool: Option<String>,
    #[serde(default)]
    pub messages: Vec<SessionMessage>,
    #[serde(default)]
    pub assets: Vec<String>,
    #[serde(default)]
    pub metadata: OrderedMap,
    #[serde(with = "crate::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl SessionManifest {
    pub fn new(session_id: String, now: DateTime<Utc>) -> Self {
        Self {
            session_id,
            status: SessionStatus::Idle,
            stage: "created".to_string(),
            planned_tool: None,
            messages: Vec::new(),
            assets: Vec::new(),
            metadata: OrderedMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append `path` to `assets` unless already present, preserving
    /// first-insertion order (spec.md §3 invariant).
    pub fn push_asset(&mut self, path: String) {
        if !self.assets.contains(&path) {
            self.assets.push(path);
        }
    }

    pub fn push_message(&mut self, role: MessageRole, content: String, now: DateTime<Utc>) {
        self.messages.push(SessionMessage { role, content, created_at: now });
    }
}

impl From<&SessionManifest> for StructuredValue {
    fn from(manifest: &SessionManifest) -> Self {
        let json = serde_json::to_value(manifest).expect("SessionManifest always serializes");
        StructuredValue::from(json)
    }
}
