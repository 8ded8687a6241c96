//! Shared application state (grounded in the teacher's `state.rs`): one
//! `Clone`-able struct of `Arc`-wrapped services, built once at startup and
//! threaded through every handler via axum's `State` extractor.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use autosage_core::config::Config;
use autosage_jobs::JobStore;
use autosage_orchestrator::{PlanSource, PlannedToolCall, StaticPlanSource, StreamingOrchestrator};
use autosage_sessions::SessionManifold;
use autosage_tools::{default_registry, ExecutionEngine, ToolRegistry};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<ToolRegistry>,
    pub engine: Arc<ExecutionEngine>,
    pub jobs: Arc<JobStore>,
    pub sessions: Arc<SessionManifold>,
    pub orchestrator: Arc<StreamingOrchestrator>,
    /// Session ids with an in-flight `/chat` turn — coarser than
    /// `SessionManifold`'s per-mutation lock, since a turn spans several
    /// mutations (see `api::chat`).
    pub busy_sessions: Arc<Mutex<HashSet<String>>>,
}

impl AppState {
    /// Build the full set of process-lifetime services from `config`.
    /// Each service hydrates its on-disk state (JobStore, SessionManifold)
    /// as part of construction.
    pub fn build(config: Arc<Config>) -> autosage_core::Result<Self> {
        let registry = Arc::new(default_registry()?);
        let concurrency = config.execution.resolved_concurrency();
        let engine = Arc::new(ExecutionEngine::new(
            registry.clone(),
            config.workspace.jobs_path.clone(),
            concurrency,
        ));
        let jobs = Arc::new(JobStore::new(&config.workspace.jobs_path, true)?);
        let sessions = Arc::new(SessionManifold::new(&config.workspace.sessions_path)?);

        let plan_source: Arc<dyn PlanSource> = Arc::new(default_plan_source());
        let orchestrator = Arc::new(StreamingOrchestrator::new(
            engine.clone(),
            sessions.clone(),
            plan_source,
        ));

        Ok(Self {
            config,
            registry,
            engine,
            jobs,
            sessions,
            orchestrator,
            busy_sessions: Arc::new(Mutex::new(HashSet::new())),
        })
    }
}

/// The fixed geometry-fit pipeline a chat turn drives today (spec.md §4.5
/// names the plan source as an abstract collaborator; a real planner is
/// future work — see DESIGN.md).
fn default_plan_source() -> StaticPlanSource {
    use autosage_core::value::StructuredValue;

    StaticPlanSource::new(
        "Looking at your upload — fitting primitives next.",
        vec![PlannedToolCall {
            tool_name: "geometry.dsl_fit_open3d".to_string(),
            stage_name: "geometry_fit".to_string(),
            expected_asset_paths: vec!["geometry/primitives.json".to_string()],
            input: StructuredValue::object([("points".to_string(), StructuredValue::Array(vec![]))]),
        }],
    )
}
