//! The document's local task set.
//!
//! Debounced work is spawned onto a [`LocalSet`] owned by the document
//! rather than onto whatever set happens to be running, so spawning never
//! depends on the caller's context. Spawned tasks only make progress while
//! the host drives the set with [`Scheduler::run_until`].

use std::fmt;
use std::future::Future;
use std::rc::Rc;

use tokio::task::{JoinHandle, LocalSet};

/// Shared handle to one local task set.
#[derive(Clone, Default)]
pub struct Scheduler {
    tasks: Rc<LocalSet>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `future` on the set. Works with or without a running runtime.
    pub fn spawn<F>(&self, future: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + 'static,
    {
        self.tasks.spawn_local(future)
    }

    /// Run `future` to completion while driving the queued tasks.
    ///
    /// Must be awaited on a current-thread `tokio` runtime.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.tasks.run_until(future).await
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;

    #[test]
    fn spawn_outside_a_runtime_queues() {
        let scheduler = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let handle = {
            let ran = Rc::clone(&ran);
            scheduler.spawn(async move { ran.set(true) })
        };
        assert!(!ran.get());
        assert!(!handle.is_finished());

        tokio_test::block_on(scheduler.run_until(tokio::task::yield_now()));
        assert!(ran.get());
    }

    #[tokio::test(start_paused = true)]
    async fn aborted_task_never_runs() {
        let scheduler = Scheduler::new();
        let ran = Rc::new(Cell::new(false));
        let handle = {
            let ran = Rc::clone(&ran);
            scheduler.spawn(async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                ran.set(true);
            })
        };
        handle.abort();
        scheduler
            .run_until(tokio::time::sleep(Duration::from_millis(50)))
            .await;
        assert!(!ran.get());
    }
}
