//! The container element (a "card").
//!
//! On attachment a container picks up an inline `<template>` child if it has
//! one, lets its [`Container`] run `on_connected`, installs listeners for
//! the component lifecycle events bubbling up from its descendants, and
//! renders its template into a content slot. Detachment removes exactly the
//! listeners attachment installed.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use super::traits::{Container, ContainerClass};
use crate::dom::document::{Document, WeakDocument};
use crate::dom::lifecycle::ElementState;
use crate::dom::node::NodeId;
use crate::dom::registry::CustomElement;
use crate::error::SelectorError;
use crate::event::{ComponentLifecycle, ListenerId, COMPONENT_ADDED, COMPONENT_REMOVED};

pub struct ContainerElement {
    node: NodeId,
    class: ContainerClass,
    doc: WeakDocument,
    this: Weak<ContainerElement>,
    container: Rc<dyn Container>,
    template: RefCell<Option<String>>,
    listeners: RefCell<Vec<ListenerId>>,
    state: Cell<ElementState>,
    render_count: Cell<usize>,
}

impl ContainerElement {
    pub(crate) fn new(doc: &Document, node: NodeId, class: ContainerClass) -> Rc<Self> {
        let container = class.instantiate();
        Rc::new_cyclic(|this| Self {
            node,
            class,
            doc: doc.downgrade(),
            this: Weak::clone(this),
            container,
            template: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            state: Cell::new(ElementState::Unattached),
            render_count: Cell::new(0),
        })
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

    pub fn render_count(&self) -> usize {
        self.render_count.get()
    }

    /// Run `f` on the container downcast to `K`.
    pub fn with_container<K: Container, R>(&self, f: impl FnOnce(&K) -> R) -> Option<R> {
        self.container.as_any().downcast_ref::<K>().map(f)
    }

    /// The template in effect: the inline `<template>` if one was found,
    /// otherwise the container's own.
    pub fn template(&self) -> String {
        self.template
            .borrow()
            .clone()
            .unwrap_or_else(|| self.container.template())
    }

    /// Descendants matching `selector`.
    pub fn query(&self, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        match self.doc.upgrade() {
            Some(doc) => doc.query_selector_all(self.node, selector),
            None => Ok(Vec::new()),
        }
    }

    pub fn show(&self) {
        self.set_visibility("visible");
    }

    pub fn hide(&self) {
        self.set_visibility("hidden");
    }

    pub fn is_hidden(&self) -> bool {
        self.doc
            .upgrade()
            .and_then(|doc| doc.attribute(self.node, "visibility"))
            .is_some_and(|v| v == "hidden")
    }

    fn set_visibility(&self, value: &str) {
        if let Some(doc) = self.doc.upgrade() {
            doc.set_attribute(self.node, "visibility", value);
        }
    }

    /// Replace every child with the template wrapped in the content slot.
    /// A blank template leaves the children alone.
    pub fn render(&self, doc: &Document) {
        let template = self.template();
        if template.trim().is_empty() {
            return;
        }
        let markup = format!(r#"<div slot="{}">{template}</div>"#, doc.config().content_slot);
        let children = doc.children(self.node);
        match doc.replace_nodes(self.node, &children, 0, &markup, None) {
            Ok(_) => {
                self.render_count.set(self.render_count.get() + 1);
                tracing::trace!(tag = %self.tag(), "container rendered");
            }
            Err(err) => doc.report_error(err),
        }
    }

    fn install_listeners(&self, doc: &Document) {
        let added = {
            let this = Weak::clone(&self.this);
            doc.add_event_listener(self.node, COMPONENT_ADDED, move |doc, event| {
                if let (Some(card), Some(detail)) = (this.upgrade(), event.detail::<ComponentLifecycle>()) {
                    card.container.on_component_ready(doc, &card, detail);
                }
            })
        };
        let removed = {
            let this = Weak::clone(&self.this);
            doc.add_event_listener(self.node, COMPONENT_REMOVED, move |doc, event| {
                if let (Some(card), Some(detail)) = (this.upgrade(), event.detail::<ComponentLifecycle>()) {
                    card.container.on_component_removed(doc, &card, detail);
                }
            })
        };
        self.listeners.borrow_mut().extend([added, removed]);
    }
}

impl CustomElement for ContainerElement {
    fn connected(&self, doc: &Document, node: NodeId) {
        self.state.set(ElementState::Attached);

        let inline = doc
            .children(node)
            .into_iter()
            .find(|&child| doc.tag(child).as_deref() == Some("template"));
        if let Some(inline) = inline {
            *self.template.borrow_mut() = Some(doc.text_content(inline));
            doc.destroy(inline);
        }

        self.container.on_connected(doc, self);
        self.install_listeners(doc);
        self.render(doc);
        tracing::debug!(tag = %self.tag(), "container attached");
    }

    fn disconnected(&self, doc: &Document, _node: NodeId, _former_path: &[NodeId]) {
        self.state.set(ElementState::Detached);
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for id in listeners {
            doc.remove_event_listener(id);
        }
        tracing::debug!(tag = %self.tag(), "container detached");
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn std::any::Any> {
        self
    }
}

impl fmt::Debug for ContainerElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerElement")
            .field("tag", &self.tag())
            .field("state", &self.state.get())
            .field("listeners", &self.listeners.borrow().len())
            .finish()
    }
}
