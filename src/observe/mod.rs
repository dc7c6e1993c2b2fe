//! Mutation records and the change-observer subscription layer.

pub mod change_observer;
pub mod mutation;

pub use change_observer::{ChangeObserver, NodesCallback, ValueCallback};
pub use mutation::{MutationCallback, MutationKind, MutationRecord, ObserveOptions, ObserverId};
