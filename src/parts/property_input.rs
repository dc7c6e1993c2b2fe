//! `property-input`: two-way binding between an input-like child and one
//! property of the governing element.
//!
//! ```text
//! <count-view count="3">
//!   <property-input property="count" type="number" min="0" defaultvalue="0"></property-input>
//! </count-view>
//! ```
//!
//! User edits (`input` events) are debounced and written through the
//! element's property proxy. Attribute changes made elsewhere reach the
//! input through a [`ChangeObserver`] and are written without dispatching an
//! event. Each side skips writes that would not change anything, so neither
//! direction echoes back.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::governing_element;
use crate::component::ManagedElement;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::CustomElement;
use crate::event::{InputDetail, ListenerId, INPUT};
use crate::observe::ChangeObserver;
use crate::timing::Debouncer;

/// Attributes copied from the part onto a created input, per input type.
fn valid_attributes(kind: &str) -> &'static [&'static str] {
    match kind {
        "number" | "range" => &["step", "max", "min"],
        "textarea" => &["rows", "cols"],
        "date" | "checkbox" => &[],
        _ => &["length"],
    }
}

/// Where an input-like element keeps its value.
fn is_textarea(doc: &Document, input: NodeId) -> bool {
    doc.tag(input).as_deref() == Some("textarea")
}

/// Current value of an input-like element.
pub fn read_input(doc: &Document, input: NodeId) -> String {
    if is_textarea(doc, input) {
        doc.text_content(input)
    } else {
        doc.attribute(input, "value").unwrap_or_default()
    }
}

/// Set the value of an input-like element without dispatching events.
pub fn write_input(doc: &Document, input: NodeId, value: &str) {
    if read_input(doc, input) == value {
        return;
    }
    if is_textarea(doc, input) {
        doc.set_text_content(input, value);
    } else {
        doc.set_attribute(input, "value", value);
    }
}

struct Binding {
    target: NodeId,
    property: String,
    input: NodeId,
    created: bool,
    default_value: Option<String>,
    listener: ListenerId,
}

pub struct PropertyInput {
    this: Weak<PropertyInput>,
    binding: RefCell<Option<Binding>>,
    watcher: RefCell<Option<ChangeObserver>>,
    debouncer: RefCell<Option<Debouncer<String>>>,
    commits: Cell<usize>,
}

impl PropertyInput {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: Weak::clone(this),
            binding: RefCell::new(None),
            watcher: RefCell::new(None),
            debouncer: RefCell::new(None),
            commits: Cell::new(0),
        })
    }

    /// The bound input element while attached.
    pub fn input(&self) -> Option<NodeId> {
        self.binding.borrow().as_ref().map(|b| b.input)
    }

    /// The governing element while attached.
    pub fn target(&self) -> Option<NodeId> {
        self.binding.borrow().as_ref().map(|b| b.target)
    }

    /// Number of user edits written to the target.
    pub fn commit_count(&self) -> usize {
        self.commits.get()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.borrow().as_ref().is_some_and(Debouncer::is_pending)
    }

    /// Write a settled user edit to the target.
    fn commit(&self, doc: &Document, value: String) {
        let (target, property, value) = {
            let binding = self.binding.borrow();
            let Some(binding) = binding.as_ref() else {
                return;
            };
            let value = match (&binding.default_value, value.is_empty()) {
                (Some(default), true) => default.clone(),
                _ => value,
            };
            (binding.target, binding.property.clone(), value)
        };
        if doc.attribute(target, &property).as_deref() == Some(value.as_str()) {
            return;
        }
        self.commits.set(self.commits.get() + 1);
        match doc.element_as::<ManagedElement>(target) {
            Some(element) if element.properties().contains(&property) => {
                element.set(&property, value);
            }
            _ => doc.set_attribute(target, &property, value),
        }
        doc.flush();
    }

    /// Mirror a target attribute change into the input.
    fn sync_input(&self, doc: &Document, value: Option<&str>) {
        let Some(input) = self.input() else {
            return;
        };
        write_input(doc, input, value.unwrap_or_default());
    }

    /// Find the `input` selector match, or create an input from `type`.
    fn locate_input(&self, doc: &Document, node: NodeId, target: NodeId) -> Option<(NodeId, bool)> {
        if let Some(selector) = doc.attribute(node, "input") {
            return match doc.query_selector(target, &selector) {
                Ok(Some(found)) => Some((found, false)),
                Ok(None) => {
                    tracing::debug!(selector = %selector, "property-input input not found");
                    None
                }
                Err(err) => {
                    doc.report_error(err);
                    None
                }
            };
        }
        let kind = doc.attribute(node, "type").unwrap_or_else(|| "text".to_owned());
        let input = if kind == "textarea" {
            doc.create_element("textarea")
        } else {
            let input = doc.create_element("input");
            doc.set_attribute(input, "type", kind.as_str());
            input
        };
        for name in valid_attributes(&kind) {
            if let Some(value) = doc.attribute(node, name) {
                doc.set_attribute(input, name, value);
            }
        }
        doc.append_child(node, input);
        Some((input, true))
    }
}

impl CustomElement for PropertyInput {
    fn connected(&self, doc: &Document, node: NodeId) {
        let Some(target) = governing_element(doc, node) else {
            return;
        };
        let Some(property) = doc.attribute(node, "property") else {
            tracing::debug!(?node, "property-input without a property");
            return;
        };
        let Some((input, created)) = self.locate_input(doc, node, target) else {
            return;
        };
        let default_value = doc.attribute(node, "defaultvalue");
        let seed = doc
            .attribute(target, &property)
            .or_else(|| default_value.clone())
            .unwrap_or_default();
        write_input(doc, input, &seed);

        let debouncer = {
            let this = Weak::clone(&self.this);
            let weak_doc = doc.downgrade();
            Debouncer::new(doc.scheduler(), doc.config().debounce_window, move |value: String| {
                if let (Some(part), Some(doc)) = (this.upgrade(), weak_doc.upgrade()) {
                    part.commit(&doc, value);
                }
            })
        };
        *self.debouncer.borrow_mut() = Some(debouncer);

        let listener = {
            let this = Weak::clone(&self.this);
            doc.add_event_listener(input, INPUT, move |doc, event| {
                let Some(part) = this.upgrade() else {
                    return;
                };
                let value = match event.detail::<InputDetail>() {
                    Some(detail) => detail.value.clone(),
                    None => read_input(doc, input),
                };
                if let Some(debouncer) = part.debouncer.borrow().as_ref() {
                    debouncer.call(value);
                };
            })
        };

        let mut watcher = ChangeObserver::new();
        let this = Weak::clone(&self.this);
        let started = watcher
            .watch_attribute(
                &property,
                move |doc, value| {
                    if let Some(part) = this.upgrade() {
                        part.sync_input(doc, value);
                    }
                },
                false,
            )
            .and_then(|watcher| watcher.start_watching(doc, target));
        if let Err(err) = started {
            doc.report_error(err);
        }
        *self.watcher.borrow_mut() = Some(watcher);
        *self.binding.borrow_mut() = Some(Binding {
            target,
            property,
            input,
            created,
            default_value,
            listener,
        });
    }

    fn disconnected(&self, doc: &Document, _node: NodeId, _former_path: &[NodeId]) {
        if let Some(mut watcher) = self.watcher.borrow_mut().take() {
            watcher.stop_watching();
        }
        if let Some(debouncer) = self.debouncer.borrow_mut().take() {
            debouncer.cancel();
        }
        let Some(binding) = self.binding.borrow_mut().take() else {
            return;
        };
        doc.remove_event_listener(binding.listener);
        if binding.created {
            doc.destroy(binding.input);
        }
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn std::any::Any> {
        self
    }
}
