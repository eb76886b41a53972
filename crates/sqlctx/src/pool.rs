//! Free-list of reusable builder contexts.

use crate::context::ContextState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Idle builder states shared by every caller of one [`Db`](crate::Db).
///
/// A state is either on the free-list or owned by exactly one checked-out
/// [`Context`](crate::Context); it is moved out under the lock, so concurrent
/// acquisitions never see the same state. States are reset on the way out
/// and on the way back in.
#[derive(Debug)]
pub struct ContextPool {
    idle: Mutex<Vec<Box<ContextState>>>,
    max_idle: Option<usize>,
    next_id: AtomicU64,
}

impl ContextPool {
    /// Create an empty pool. `max_idle` caps how many released states are kept.
    pub fn new(max_idle: Option<usize>) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle,
            next_id: AtomicU64::new(0),
        }
    }

    /// Number of idle states ready for reuse.
    pub fn idle_count(&self) -> usize {
        self.lock().len()
    }

    /// Number of states allocated over the pool's lifetime.
    pub fn allocated(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }

    pub(crate) fn acquire(&self) -> Box<ContextState> {
        let reused = self.lock().pop();
        let mut state = match reused {
            Some(state) => state,
            None => self.allocate(),
        };
        state.reset();
        state
    }

    pub(crate) fn release(&self, mut state: Box<ContextState>) {
        state.reset();
        let mut idle = self.lock();
        if self.max_idle.is_some_and(|max| idle.len() >= max) {
            return;
        }
        idle.push(state);
    }

    fn allocate(&self) -> Box<ContextState> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(target: "sqlctx.pool", ctx = id, "allocated builder context");
        Box::new(ContextState::new(id))
    }

    // A panic while holding the lock cannot leave a state half-mutated on
    // the list, so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, Vec<Box<ContextState>>> {
        self.idle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ContextPool {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn test_acquire_allocates_then_reuses() {
        let pool = ContextPool::default();
        let first = pool.acquire();
        let first_id = first.id;
        assert_eq!(pool.allocated(), 1);

        pool.release(first);
        assert_eq!(pool.idle_count(), 1);

        let again = pool.acquire();
        assert_eq!(again.id, first_id);
        assert_eq!(pool.allocated(), 1);
        assert_eq!(pool.idle_count(), 0);
    }

    #[test]
    fn test_release_resets_state() {
        let pool = ContextPool::default();
        let mut state = pool.acquire();
        state.table = "users".into();
        state.push_where("id=?".into(), params![1]);
        state.lock_x = true;
        pool.release(state);

        let state = pool.acquire();
        assert!(state.is_pristine());
    }

    #[test]
    fn test_held_states_are_distinct() {
        let pool = ContextPool::default();
        let a = pool.acquire();
        let b = pool.acquire();
        assert_ne!(a.id, b.id);
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle_count(), 2);
    }

    #[test]
    fn test_max_idle_drops_surplus() {
        let pool = ContextPool::new(Some(1));
        let a = pool.acquire();
        let b = pool.acquire();
        pool.release(a);
        pool.release(b);
        assert_eq!(pool.idle_count(), 1);
    }
}
