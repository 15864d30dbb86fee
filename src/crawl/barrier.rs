// src/crawl/barrier.rs
// =============================================================================
// This module counts fetch tasks that haven't finished yet.
//
// How it works:
// - enter() bumps the count and hands back a TaskGuard
// - The task keeps the guard alive until it's done
// - Dropping the guard lowers the count (this also happens if the task
//   panics, because Drop runs during unwinding)
// - wait() returns once the count is back to zero
//
// The orchestrator closes the writer's inbox only after wait() returns, so
// no task can still be holding a page it hasn't sent.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    drained: Notify,
}

/// Shared counter of in-flight tasks with a wait-for-zero
#[derive(Debug, Clone, Default)]
pub struct CompletionBarrier {
    inner: Arc<Inner>,
}

/// Proof that a task is registered with a barrier; drop it when the task ends
#[derive(Debug)]
#[must_use = "the task is counted as finished as soon as the guard is dropped"]
pub struct TaskGuard {
    inner: Arc<Inner>,
}

impl CompletionBarrier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&self) -> TaskGuard {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        TaskGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Resolves once every guard handed out so far has been dropped.
    pub async fn wait(&self) {
        loop {
            let drained = self.inner.drained.notified();
            tokio::pin!(drained);
            // Register before checking so a drop in between can't be missed
            drained.as_mut().enable();

            if self.outstanding() == 0 {
                return;
            }
            drained.await;
        }
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.drained.notify_waiters();
        }
    }
}
