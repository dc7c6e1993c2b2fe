//! Event system: named events with downcastable details, listeners, bubbling.

pub mod handler;
pub mod message;

pub use handler::{Listener, ListenerId, ListenerTable};
pub use message::{
    ComponentLifecycle, Custom, Event, EventDetail, InputDetail, COMPONENT_ADDED,
    COMPONENT_REMOVED, INPUT,
};
