//! Tool descriptors — the registry's unit of record.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::execution::{ExecutionContext, ToolResult};
use crate::value::StructuredValue;

/// Maturity level of a registered tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stability {
    Stable,
    Experimental,
    Deprecated,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Stability::Stable => "stable",
            Stability::Experimental => "experimental",
            Stability::Deprecated => "deprecated",
        };
        write!(f, "{s}")
    }
}

/// One worked example attached to a [`ToolDescriptor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolExample {
    pub title: String,
    pub input: StructuredValue,
    #[serde(default)]
    pub notes: Option<String>,
}

/// The callable wrapped by a [`ToolDescriptor`].
///
/// Invokers are synchronous (see DESIGN.md / SPEC_FULL.md §9 — the
/// Open Question is resolved in favor of a synchronous invoker signature,
/// with the engine itself providing concurrency via `spawn_blocking`).
pub type Invoker = Arc<dyn Fn(StructuredValue, &ExecutionContext) -> ToolResult + Send + Sync>;

/// A registered tool: everything the registry and engine need to validate,
/// list, and dispatch an invocation.
#[derive(Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub version: String,
    pub description: String,
    pub input_schema: StructuredValue,
    pub stability: Stability,
    pub tags: BTreeSet<String>,
    pub examples: Vec<ToolExample>,
    pub invoker: Invoker,
}

impl std::fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("stability", &self.stability)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// A listing filter: narrows by stability and/or by any-tag-match.
#[derive(Debug, Clone, Default)]
pub struct ToolFilter {
    pub stability: Option<Stability>,
    pub tags: Vec<String>,
}

impl ToolFilter {
    pub fn matches(&self, descriptor: &ToolDescriptor) -> bool {
        if let Some(stability) = self.stability {
            if descriptor.stability != stability {
                return false;
            }
        }
        if !self.tags.is_empty() && !self.tags.iter().any(|t| descriptor.tags.contains(t)) {
            return false;
        }
        true
    }
}

/// A JSON-serializable view of a [`ToolDescriptor`] (the `invoker` field
/// cannot, and should not, cross the wire).
#[derive(Debug, Clone, Serialize)]
pub struct ToolSummary {
    pub name: String,
    pub version: String,
    pub description: String,
    pub input_schema: StructuredValue,
    pub stability: Stability,
    pub tags: Vec<String>,
    pub examples: Vec<ToolExample>,
}

impl From<&ToolDescriptor> for ToolSummary {
    fn from(d: &ToolDescriptor) -> Self {
        Self {
            name: d.name.clone(),
            version: d.version.clone(),
            description: d.description.clone(),
            input_schema: d.input_schema.clone(),
            stability: d.stability,
            tags: d.tags.iter().cloned().collect(),
            examples: d.examples.clone(),
        }
    }
}
