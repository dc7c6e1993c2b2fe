//! Event envelope and built-in event details.
//!
//! The [`EventDetail`] trait is object-safe and supports downcasting via `Any`.
//! [`Event`] carries a name, routing metadata (target, bubbling) and an
//! optional shared detail. Built-in details: [`ComponentLifecycle`],
//! [`InputDetail`], [`Custom`].

use std::any::Any;
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::component::ElementId;
use crate::dom::node::NodeId;

/// Emitted by a managed element once it is attached and rendered.
pub const COMPONENT_ADDED: &str = "component-added";

/// Emitted by a managed element when it is detached.
pub const COMPONENT_REMOVED: &str = "component-removed";

/// Emitted by input-like elements when the user edits their value.
pub const INPUT: &str = "input";

// ---------------------------------------------------------------------------
// EventDetail trait
// ---------------------------------------------------------------------------

/// Object-safe event payload.
pub trait EventDetail: 'static {
    /// Upcast to `&dyn Any` for downcasting.
    fn as_any(&self) -> &dyn Any;

    /// Human-readable name for this detail type.
    fn detail_name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A named event dispatched at a node.
///
/// Cloning is cheap: the detail is shared. Debounced listeners keep a clone
/// and hand it to their script once the burst settles.
#[derive(Clone)]
pub struct Event {
    /// Event name, e.g. `"click"` or [`COMPONENT_ADDED`].
    pub name: String,
    /// The node the event was dispatched at.
    pub target: NodeId,
    /// Whether the event travels up the ancestor path after the target.
    pub bubbles: bool,
    detail: Option<Rc<dyn EventDetail>>,
    current_target: Cell<Option<NodeId>>,
    stopped: Cell<bool>,
}

impl Event {
    /// Create a non-bubbling event without detail.
    pub fn new(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            name: name.into(),
            target,
            bubbles: false,
            detail: None,
            current_target: Cell::new(None),
            stopped: Cell::new(false),
        }
    }

    /// Create a bubbling event without detail.
    pub fn bubbling(name: impl Into<String>, target: NodeId) -> Self {
        Self {
            bubbles: true,
            ..Self::new(name, target)
        }
    }

    /// Attach a detail (builder).
    pub fn with_detail(mut self, detail: impl EventDetail) -> Self {
        self.detail = Some(Rc::new(detail));
        self
    }

    /// Attempt to downcast the detail to a concrete type.
    pub fn detail<T: EventDetail>(&self) -> Option<&T> {
        self.detail.as_ref()?.as_any().downcast_ref::<T>()
    }

    /// The node whose listeners are currently running.
    pub fn current_target(&self) -> Option<NodeId> {
        self.current_target.get()
    }

    pub(crate) fn set_current_target(&self, node: NodeId) {
        self.current_target.set(Some(node));
    }

    /// Stop the event from reaching further nodes on its path. Listeners on
    /// the current node still run.
    pub fn stop_propagation(&self) {
        self.stopped.set(true);
    }

    pub fn is_propagation_stopped(&self) -> bool {
        self.stopped.get()
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("bubbles", &self.bubbles)
            .field("detail", &self.detail.as_ref().map(|d| d.detail_name()))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Built-in details
// ---------------------------------------------------------------------------

/// Detail of [`COMPONENT_ADDED`] and [`COMPONENT_REMOVED`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentLifecycle {
    pub element_id: ElementId,
    pub node: NodeId,
    pub tag: String,
}

impl EventDetail for ComponentLifecycle {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn detail_name(&self) -> &str {
        "ComponentLifecycle"
    }
}

/// Detail of [`INPUT`]: the edited value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDetail {
    pub value: String,
}

impl EventDetail for InputDetail {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn detail_name(&self) -> &str {
        "InputDetail"
    }
}

/// User-defined string payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Custom(pub String);

impl Custom {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }
}

impl EventDetail for Custom {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn detail_name(&self) -> &str {
        "Custom"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn make_id(sm: &mut SlotMap<NodeId, ()>) -> NodeId {
        sm.insert(())
    }

    #[test]
    fn new_event_does_not_bubble() {
        let mut sm = SlotMap::with_key();
        let target = make_id(&mut sm);
        let event = Event::new("click", target);
        assert_eq!(event.name, "click");
        assert_eq!(event.target, target);
        assert!(!event.bubbles);
        assert!(event.detail::<Custom>().is_none());
    }

    #[test]
    fn bubbling_event() {
        let mut sm = SlotMap::with_key();
        let event = Event::bubbling(COMPONENT_ADDED, make_id(&mut sm));
        assert!(event.bubbles);
    }

    #[test]
    fn detail_downcast() {
        let mut sm = SlotMap::with_key();
        let node = make_id(&mut sm);
        let event = Event::new(INPUT, node).with_detail(InputDetail {
            value: "42".into(),
        });
        assert_eq!(event.detail::<InputDetail>().unwrap().value, "42");
        assert!(event.detail::<Custom>().is_none());
    }

    #[test]
    fn clone_shares_detail() {
        let mut sm = SlotMap::with_key();
        let node = make_id(&mut sm);
        let event = Event::bubbling("saved", node).with_detail(Custom::new("ok"));
        let copy = event.clone();
        assert_eq!(copy.detail::<Custom>(), Some(&Custom::new("ok")));
        assert_eq!(copy.name, "saved");
    }

    #[test]
    fn stop_propagation_flag() {
        let mut sm = SlotMap::with_key();
        let event = Event::bubbling("x", make_id(&mut sm));
        assert!(!event.is_propagation_stopped());
        event.stop_propagation();
        assert!(event.is_propagation_stopped());
    }

    #[test]
    fn debug_names_detail() {
        let mut sm = SlotMap::with_key();
        let node = make_id(&mut sm);
        let event = Event::new("x", node).with_detail(Custom::new("y"));
        let dbg = format!("{event:?}");
        assert!(dbg.contains("Event"));
        assert!(dbg.contains("Custom"));
    }
}
