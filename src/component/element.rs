//! The managed element: host-side wrapper owning one component instance.
//!
//! Property writes go through the [`ObservedProperties`] proxy, which
//! reflects them to the host attribute and re-renders. Attribute writes from
//! outside land in `attribute_changed`, which updates the backing map
//! directly. The reflected attribute write comes back through
//! `attribute_changed` with an identical string and stops there.
//!
//! Children present before the first attachment become the *parts*
//! partition; rendered markup is the *content* partition, always inserted in
//! front of the parts and the only thing a render replaces.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::class::ComponentClass;
use super::properties::ObservedProperties;
use super::traits::{Component, ComponentContext};
use super::value::Value;
use crate::container::ContainerElement;
use crate::dom::document::{Document, WeakDocument};
use crate::dom::lifecycle::ElementState;
use crate::dom::node::{is_custom_tag, NodeId};
use crate::dom::registry::CustomElement;
use crate::dom::traverse::{nearest_ancestor, NodeRef, TreeNode};
use crate::event::{ComponentLifecycle, Event, COMPONENT_ADDED, COMPONENT_REMOVED};

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-wide unique id of a managed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u64);

impl ElementId {
    fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "el-{}", self.0)
    }
}

/// Host element wrapping exactly one component instance at a time.
pub struct ManagedElement {
    id: ElementId,
    node: NodeId,
    class: ComponentClass,
    doc: WeakDocument,
    component: RefCell<Option<Rc<dyn Component>>>,
    properties: Rc<ObservedProperties>,
    parts: RefCell<Vec<NodeId>>,
    content: RefCell<Vec<NodeId>>,
    container: Cell<Option<NodeId>>,
    state: Cell<ElementState>,
    render_count: Cell<usize>,
}

impl ManagedElement {
    /// Build the element for `node`, seeding observable properties from the
    /// attributes already on it.
    pub(crate) fn new(doc: &Document, node: NodeId, class: ComponentClass) -> Rc<Self> {
        let properties = Rc::new(ObservedProperties::new(class.observable_properties()));
        for (name, value) in doc.attributes(node) {
            if properties.contains(&name) {
                properties.set_quiet(&name, Value::from_attribute(&value));
            }
        }
        let component = class.instantiate();

        Rc::new_cyclic(|this: &Weak<Self>| {
            let weak = Weak::clone(this);
            properties.subscribe(move |name, old, new| {
                if let Some(element) = weak.upgrade() {
                    element.on_property_write(name, old, new);
                }
            });
            Self {
                id: ElementId::next(),
                node,
                class,
                doc: doc.downgrade(),
                component: RefCell::new(Some(component)),
                properties,
                parts: RefCell::new(Vec::new()),
                content: RefCell::new(Vec::new()),
                container: Cell::new(None),
                state: Cell::new(ElementState::Unattached),
                render_count: Cell::new(0),
            }
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tag(&self) -> &str {
        self.class.tag()
    }

    pub fn state(&self) -> ElementState {
        self.state.get()
    }

    pub fn properties(&self) -> &ObservedProperties {
        &self.properties
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.properties.get(name)
    }

    /// Write a property through the proxy.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        self.properties.set(name, value)
    }

    /// Number of renders since construction.
    pub fn render_count(&self) -> usize {
        self.render_count.get()
    }

    /// The governing container resolved at the last attachment.
    pub fn container(&self) -> Option<NodeId> {
        self.container.get()
    }

    pub fn parts(&self) -> Vec<NodeId> {
        self.parts.borrow().clone()
    }

    /// Parts carrying `tag`.
    pub fn parts_of(&self, doc: &Document, tag: &str) -> Vec<NodeId> {
        self.parts
            .borrow()
            .iter()
            .copied()
            .filter(|&part| doc.tag(part).as_deref() == Some(tag))
            .collect()
    }

    pub fn content(&self) -> Vec<NodeId> {
        self.content.borrow().clone()
    }

    /// The live component, if attached or not yet attached.
    pub fn component(&self) -> Option<Rc<dyn Component>> {
        self.component.borrow().clone()
    }

    /// Run `f` on the live component downcast to `C`.
    pub fn with_component<C: Component, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let component = self.component()?;
        component.as_any().downcast_ref::<C>().map(f)
    }

    /// Replace the content partition with the current template.
    pub fn render(&self, doc: &Document) {
        let Some(component) = self.component() else {
            return;
        };
        let markup = component.template(&self.properties);
        let old = self.content.borrow().clone();
        let slot = doc.config().content_slot.clone();
        match doc.replace_nodes(self.node, &old, 0, &markup, Some(&slot)) {
            Ok(nodes) => {
                *self.content.borrow_mut() = nodes;
                self.render_count.set(self.render_count.get() + 1);
                tracing::trace!(tag = %self.tag(), id = %self.id, "component rendered");
            }
            Err(err) => doc.report_error(err),
        }
    }

    fn on_property_write(&self, name: &str, old: &Value, new: &Value) {
        if self.state.get() == ElementState::Detached {
            return;
        }
        let Some(doc) = self.doc.upgrade() else {
            return;
        };
        match new {
            Value::Null => {
                doc.remove_attribute(self.node, name);
            }
            value => doc.set_attribute(self.node, name, value.to_attribute()),
        }
        if self.state.get() == ElementState::Attached {
            self.render(&doc);
        }
        if let Some(component) = self.component() {
            component.on_property_changed(&ComponentContext::new(&doc, self), name, old, new);
        }
    }

    fn lifecycle_event(&self, name: &str) -> Event {
        Event::bubbling(name, self.node).with_detail(ComponentLifecycle {
            element_id: self.id,
            node: self.node,
            tag: self.tag().to_owned(),
        })
    }

    /// Nearest hyphenated ancestor that is a container element.
    fn resolve_container(&self, doc: &Document) -> Option<NodeId> {
        let tree = doc.tree();
        let start = NodeRef::new(&tree, self.node);
        nearest_ancestor(&start, &doc.config().root_tag, |candidate| {
            candidate.tag_name().is_some_and(is_custom_tag)
                && doc.element_as::<ContainerElement>(candidate.id).is_some()
        })
        .map(|found| found.id)
    }

    /// Push property values written while detached out to the attributes.
    fn reflect_all(&self, doc: &Document) {
        for (name, value) in self.properties.snapshot() {
            let current = doc.attribute(self.node, &name).unwrap_or_default();
            if current != value.to_attribute() {
                doc.set_attribute(self.node, &name, value.to_attribute());
            }
        }
    }
}

impl CustomElement for ManagedElement {
    fn connected(&self, doc: &Document, node: NodeId) {
        if self.state.get() == ElementState::Detached {
            *self.component.borrow_mut() = Some(self.class.instantiate());
            self.reflect_all(doc);
        }
        self.state.set(ElementState::Attached);

        let content = self.content.borrow().clone();
        let parts: Vec<NodeId> = doc
            .children(node)
            .into_iter()
            .filter(|child| !content.contains(child))
            .collect();
        let parts_slot = doc.config().parts_slot.clone();
        for &part in &parts {
            if !doc.is_text(part) && doc.attribute(part, "slot").as_deref() != Some(&parts_slot) {
                doc.set_attribute(part, "slot", parts_slot.as_str());
            }
        }
        *self.parts.borrow_mut() = parts;

        self.render(doc);
        doc.dispatch_event(&self.lifecycle_event(COMPONENT_ADDED));

        let container = self.resolve_container(doc);
        if container.is_none() {
            tracing::debug!(tag = %self.tag(), id = %self.id, "no governing container");
        }
        self.container.set(container);

        tracing::debug!(tag = %self.tag(), id = %self.id, "component attached");
        if let Some(component) = self.component() {
            component.on_ready(&ComponentContext::new(doc, self));
        }
    }

    fn disconnected(&self, doc: &Document, node: NodeId, former_path: &[NodeId]) {
        if self.state.get() != ElementState::Attached {
            return;
        }
        self.state.set(ElementState::Detached);

        let mut path = Vec::with_capacity(former_path.len() + 1);
        path.push(node);
        path.extend_from_slice(former_path);
        doc.dispatch_event_along(&self.lifecycle_event(COMPONENT_REMOVED), &path);

        if let Some(component) = self.component() {
            component.on_removed(&ComponentContext::new(doc, self));
        }
        self.component.borrow_mut().take();
        self.container.set(None);
        tracing::debug!(tag = %self.tag(), id = %self.id, "component detached");
    }

    fn attribute_changed(
        &self,
        doc: &Document,
        _node: NodeId,
        name: &str,
        _old: Option<&str>,
        new: Option<&str>,
    ) {
        if self.properties.text(name) == new.unwrap_or_default() {
            return;
        }
        let old = self.properties.get(name).unwrap_or_default();
        let value = new.map_or(Value::Null, Value::from_attribute);
        self.properties.set_quiet(name, value.clone());
        if self.state.get() != ElementState::Attached {
            return;
        }
        self.render(doc);
        if let Some(component) = self.component() {
            component.on_property_changed(&ComponentContext::new(doc, self), name, &old, &value);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn std::any::Any> {
        self
    }
}

impl fmt::Debug for ManagedElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedElement")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .field("state", &self.state.get())
            .field("properties", &self.properties)
            .field("render_count", &self.render_count.get())
            .finish()
    }
}
