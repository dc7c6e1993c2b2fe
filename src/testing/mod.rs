//! Headless testing support.
//!
//! Use the [`Harness`] to mount markup into a [`Document`](crate::dom::Document)
//! with the built-in parts defined, simulate input, and let debounce windows
//! elapse under paused `tokio` time.

pub mod harness;

pub use harness::Harness;
