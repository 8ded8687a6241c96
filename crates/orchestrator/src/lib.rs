pub mod orchestrator;
pub mod plan;
pub mod stream;

pub use orchestrator::StreamingOrchestrator;
pub use plan::{NullPlanSource, PlanSource, PlannedToolCall, StaticPlanSource};
pub use stream::StreamEvent;
