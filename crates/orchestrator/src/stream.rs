//! The canonical Server-Sent-Events protocol (spec.md §3/§6): a tagged
//! union, emitted but never stored in the event itself.

use serde::Serialize;

use autosage_sessions::SessionManifest;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum StreamEvent {
    TextDelta { delta: String },
    ToolCallStart { tool_name: String },
    StateUpdate { state: SessionManifest },
    ToolCallComplete { tool_name: String, duration_ms: u64 },
    AgentDone { status: String },
    Error { code: String, message: String },
}

impl StreamEvent {
    /// The SSE `event:` field name — one of the six names spec.md §6
    /// enumerates.
    pub fn name(&self) -> &'static str {
        match self {
            StreamEvent::TextDelta { .. } => "text_delta",
            StreamEvent::ToolCallStart { .. } => "tool_call_start",
            StreamEvent::StateUpdate { .. } => "state_update",
            StreamEvent::ToolCallComplete { .. } => "tool_call_complete",
            StreamEvent::AgentDone { .. } => "agent_done",
            StreamEvent::Error { .. } => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, StreamEvent::AgentDone { .. } | StreamEvent::Error { .. })
    }
}
