//! Per-session concurrency control.
//!
//! Ensures a session's manifest is never concurrently mutated by two
//! in-flight requests (spec.md §4.4/§5: "single writer lock per
//! aggregate"). Adapted from the teacher gateway's per-session turn lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Maps session id → `Semaphore(1)`. Holding the permit guarantees
/// exclusive write access to that session's manifest for the duration of
/// one transition.
pub struct SessionLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for SessionLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the write lock for `session_id`, waiting if another
    /// transition is already in flight.
    pub async fn acquire(&self, session_id: &str) -> OwnedSemaphorePermit {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(session_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };
        sem.acquire_owned().await.expect("session semaphore is never closed")
    }

    pub fn session_count(&self) -> usize {
        self.locks.lock().len()
    }

    /// Drop tracking for sessions with no in-flight writer.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| sem.available_permits() == 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = SessionLockMap::new();
        let permit1 = map.acquire("session_0001").await;
        drop(permit1);
        let permit2 = map.acquire("session_0001").await;
        drop(permit2);
    }

    #[tokio::test]
    async fn different_sessions_run_concurrently() {
        let map = Arc::new(SessionLockMap::new());
        let p1 = map.acquire("session_0001").await;
        let p2 = map.acquire("session_0002").await;
        assert_eq!(map.session_count(), 2);
        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_session_serializes_writers() {
        let map = Arc::new(SessionLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire("session_0001").await;
        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("session_0001").await;
            42
        });

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        drop(p1);

        let result = handle.await.unwrap();
        assert_eq!(result, 42);
    }
}
