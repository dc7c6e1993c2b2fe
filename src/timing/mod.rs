//! Timers for behaviors that wait for input to settle.

pub mod debounce;
pub mod scheduler;

pub use debounce::Debouncer;
pub use scheduler::Scheduler;
