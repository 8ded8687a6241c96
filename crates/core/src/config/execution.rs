use serde::{Deserialize, Serialize};

use crate::execution::ExecutionLimits;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Execution engine
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration for the [`crate::execution::ExecutionLimits`] defaults and
/// the engine's admission semaphore.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Maximum concurrent tool invocations. `0` means "use CPU count".
    pub max_concurrency: usize,
    pub default_limits: ExecutionLimits,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 0,
            default_limits: ExecutionLimits::default(),
        }
    }
}

impl ExecutionConfig {
    /// Resolve `max_concurrency`, substituting the host's CPU count when
    /// unset (spec.md §5: "default concurrency bound is max(1, CPU_count)").
    pub fn resolved_concurrency(&self) -> usize {
        if self.max_concurrency > 0 {
            self.max_concurrency
        } else {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
                .max(1)
        }
    }
}
