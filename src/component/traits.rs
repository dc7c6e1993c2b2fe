//! The component trait and the context handed to its hooks.

use std::any::Any;

use super::element::ManagedElement;
use super::properties::ObservedProperties;
use super::value::Value;
use crate::dom::document::Document;
use crate::dom::node::NodeId;

// ---------------------------------------------------------------------------
// Component
// ---------------------------------------------------------------------------

/// Self-contained UI logic wrapped by a [`ManagedElement`].
///
/// All methods take `&self`: a component may be re-entered while one of its
/// hooks is running (a hook that writes a property triggers a render, which
/// calls `template` again). Keep mutable state in `Cell`/`RefCell`.
pub trait Component: 'static {
    /// Markup for the content partition, derived from the current properties.
    fn template(&self, props: &ObservedProperties) -> String;

    /// Called once per attachment, after the first render.
    fn on_ready(&self, _ctx: &ComponentContext<'_>) {}

    /// Called once per detachment. The component is dropped right after.
    fn on_removed(&self, _ctx: &ComponentContext<'_>) {}

    /// Called after each accepted property change.
    fn on_property_changed(
        &self,
        _ctx: &ComponentContext<'_>,
        _name: &str,
        _old: &Value,
        _new: &Value,
    ) {
    }

    fn as_any(&self) -> &dyn Any;
}

/// A component type with static metadata, usable with
/// [`ComponentClass::of`](super::ComponentClass::of).
///
/// With the `macros` feature this can be derived:
///
/// ```ignore
/// #[derive(Default, ComponentType)]
/// #[component(tag = "count-view", observe = ["count"])]
/// struct CountView;
/// ```
pub trait ComponentType: Component + Sized {
    const TAG: &'static str;
    const OBSERVABLE_PROPERTIES: &'static [&'static str];

    fn create() -> Self;
}

// ---------------------------------------------------------------------------
// ComponentContext
// ---------------------------------------------------------------------------

/// What a component may touch from inside its hooks.
pub struct ComponentContext<'a> {
    doc: &'a Document,
    element: &'a ManagedElement,
}

impl<'a> ComponentContext<'a> {
    pub(crate) fn new(doc: &'a Document, element: &'a ManagedElement) -> Self {
        Self { doc, element }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn element(&self) -> &'a ManagedElement {
        self.element
    }

    pub fn node(&self) -> NodeId {
        self.element.node()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.element.properties().get(name)
    }

    /// Write a property through the proxy.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        self.element.set(name, value)
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        self.doc.attribute(self.element.node(), name)
    }

    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        self.doc.set_attribute(self.element.node(), name, value);
    }

    /// Parts of the element with the given tag.
    pub fn parts(&self, tag: &str) -> Vec<NodeId> {
        self.element.parts_of(self.doc, tag)
    }

    /// The governing container, if one was found at attachment.
    pub fn container(&self) -> Option<NodeId> {
        self.element.container()
    }

    pub fn request_render(&self) {
        self.element.render(self.doc);
    }
}
