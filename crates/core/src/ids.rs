//! Request-ID generators. Each of the four families is drawn from its own
//! monotonically increasing counter so the sequences never collide within
//! one process — see spec.md §3 invariants.

use std::sync::atomic::{AtomicU64, Ordering};

/// A simple per-family monotonic counter producing zero-padded ids like
/// `resp_0001`.
pub struct IdGenerator {
    prefix: &'static str,
    counter: AtomicU64,
}

impl IdGenerator {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            counter: AtomicU64::new(1),
        }
    }

    /// Allocate the next id in this family.
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{:04}", self.prefix, n)
    }

    /// Seed the counter so the next allocation is strictly greater than
    /// `existing_max` (used by hydration, e.g. `JobStore` rebuilding its
    /// counter from `job_NNNN` directories already on disk).
    pub fn seed_above(&self, existing_max: u64) {
        let mut current = self.counter.load(Ordering::Relaxed);
        loop {
            let candidate = existing_max + 1;
            if candidate <= current {
                return;
            }
            match self.counter.compare_exchange_weak(
                current,
                candidate,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }
}

pub static RESPONSE_IDS: IdGenerator = IdGenerator::new("resp_");
pub static CHAT_COMPLETION_IDS: IdGenerator = IdGenerator::new("chatcmpl_");
pub static TOOL_CALL_IDS: IdGenerator = IdGenerator::new("call_");
pub static JOB_IDS: IdGenerator = IdGenerator::new("job_");

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn unique_and_prefixed() {
        let gen = IdGenerator::new("job_");
        let ids: HashSet<String> = (0..100).map(|_| gen.next()).collect();
        assert_eq!(ids.len(), 100);
        assert!(ids.iter().all(|id| id.starts_with("job_")));
    }

    #[test]
    fn seed_above_moves_counter_forward() {
        let gen = IdGenerator::new("job_");
        gen.seed_above(42);
        assert_eq!(gen.next(), "job_0043");
    }

    #[test]
    fn seed_above_never_moves_backward() {
        let gen = IdGenerator::new("job_");
        let _ = gen.next(); // counter now at 2
        gen.seed_above(0);
        assert_eq!(gen.next(), "job_0002");
    }
}
