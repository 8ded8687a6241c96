//! The agent-plan abstraction the orchestrator drives (spec.md §4.5):
//! an acknowledgement plus zero or more planned tool calls.

use async_trait::async_trait;

use autosage_core::value::StructuredValue;

#[derive(Debug, Clone)]
pub struct PlannedToolCall {
    pub tool_name: String,
    pub stage_name: String,
    pub expected_asset_paths: Vec<String>,
    pub input: StructuredValue,
}

/// Abstract collaborator yielding an ack and a plan for a prompt. Kept
/// outside the orchestrator so callers can substitute a real planner
/// (an LLM call) without touching the drive loop.
#[async_trait]
pub trait PlanSource: Send + Sync {
    async fn ack(&self, prompt: &str) -> String;
    async fn plan(&self, prompt: &str) -> Vec<PlannedToolCall>;
}

/// A plan source that always returns the same fixed ack + step sequence,
/// regardless of prompt content — used by tests and by the
/// `/v1/sessions/{id}/chat` adapter's fixed geometry-fit → render
/// pipeline.
pub struct StaticPlanSource {
    ack: String,
    steps: Vec<PlannedToolCall>,
}

impl StaticPlanSource {
    pub fn new(ack: impl Into<String>, steps: Vec<PlannedToolCall>) -> Self {
        Self { ack: ack.into(), steps }
    }
}

#[async_trait]
impl PlanSource for StaticPlanSource {
    async fn ack(&self, _prompt: &str) -> String {
        self.ack.clone()
    }

    async fn plan(&self, _prompt: &str) -> Vec<PlannedToolCall> {
        self.steps.clone()
    }
}

/// Ack-only plan source with zero tool calls, used for plain chat turns
/// with no asset to act on.
pub struct NullPlanSource {
    ack: String,
}

impl NullPlanSource {
    pub fn new(ack: impl Into<String>) -> Self {
        Self { ack: ack.into() }
    }
}

#[async_trait]
impl PlanSource for NullPlanSource {
    async fn ack(&self, _prompt: &str) -> String {
        self.ack.clone()
    }

    async fn plan(&self, _prompt: &str) -> Vec<PlannedToolCall> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_returns_fixed_steps() {
        let source = StaticPlanSource::new(
            "Analyzing your part.",
            vec![PlannedToolCall {
                tool_name: "geometry.dsl_fit_open3d".into(),
                stage_name: "geometry_fit".into(),
                expected_asset_paths: vec!["geometry/primitives.json".into()],
                input: StructuredValue::object([]),
            }],
        );
        assert_eq!(source.ack("anything").await, "Analyzing your part.");
        assert_eq!(source.plan("anything").await.len(), 1);
    }

    #[tokio::test]
    async fn null_source_never_plans_tools() {
        let source = NullPlanSource::new("Hello!");
        assert_eq!(source.ack("hi").await, "Hello!");
        assert!(source.plan("hi").await.is_empty());
    }
}
