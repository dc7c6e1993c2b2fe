//! Trailing-edge debouncing on a `tokio` local task set.
//!
//! Each [`Debouncer::call`] aborts the task spawned by the previous call and
//! spawns a new one that sleeps for the window and then runs the action with
//! the latest argument. Only the last call of a burst has any effect.
//!
//! Tasks go onto a [`Scheduler`], so calling from synchronous code is fine;
//! the run happens once the scheduler is driven past the window.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::scheduler::Scheduler;

pub struct Debouncer<A> {
    scheduler: Scheduler,
    window: Duration,
    pending: RefCell<Option<JoinHandle<()>>>,
    action: Rc<dyn Fn(A)>,
}

impl<A: 'static> Debouncer<A> {
    pub fn new(scheduler: &Scheduler, window: Duration, action: impl Fn(A) + 'static) -> Self {
        Self {
            scheduler: scheduler.clone(),
            window,
            pending: RefCell::new(None),
            action: Rc::new(action),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Schedule the action with `arg`, replacing any scheduled run.
    pub fn call(&self, arg: A) {
        self.cancel();
        let action = Rc::clone(&self.action);
        let window = self.window;
        let handle = self.scheduler.spawn(async move {
            tokio::time::sleep(window).await;
            action(arg);
        });
        *self.pending.borrow_mut() = Some(handle);
    }

    /// Drop the scheduled run, if any. Returns whether one was waiting.
    pub fn cancel(&self) -> bool {
        match self.pending.borrow_mut().take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .borrow()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }
}

impl<A> Drop for Debouncer<A> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.get_mut().take() {
            handle.abort();
        }
    }
}
