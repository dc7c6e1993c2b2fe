//! `property-observer`: run a script whenever one attribute of the governing
//! element changes.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::governing_element;
use super::script::{ScriptArg, ScriptBehavior};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::CustomElement;
use crate::observe::ChangeObserver;

pub struct PropertyObserver {
    this: Weak<PropertyObserver>,
    script: ScriptBehavior,
    target: Cell<Option<NodeId>>,
    watcher: RefCell<Option<ChangeObserver>>,
}

impl PropertyObserver {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: Weak::clone(this),
            script: ScriptBehavior::new(),
            target: Cell::new(None),
            watcher: RefCell::new(None),
        })
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    pub fn is_watching(&self) -> bool {
        self.watcher.borrow().as_ref().is_some_and(ChangeObserver::is_watching)
    }

    fn run(&self, doc: &Document, value: Option<&str>) {
        let Some(target) = self.target.get() else {
            return;
        };
        let argument = ScriptArg::Value(value.map(str::to_owned));
        if let Err(err) = self.script.execute(doc, target, Some(argument)) {
            doc.report_error(err);
        }
    }
}

impl CustomElement for PropertyObserver {
    fn connected(&self, doc: &Document, node: NodeId) {
        let Some(target) = governing_element(doc, node) else {
            return;
        };
        let Some(property) = doc.attribute(node, "property") else {
            tracing::debug!(?node, "property-observer without a property");
            return;
        };
        let argument = doc.attribute(node, "argument").unwrap_or_else(|| "value".to_owned());
        if let Err(err) = self.script.compile(doc, node, Some(&argument)) {
            doc.report_error(err);
            return;
        }

        let mut watcher = ChangeObserver::new();
        let this = Weak::clone(&self.this);
        let started = watcher
            .watch_attribute(
                &property,
                move |doc, value| {
                    if let Some(part) = this.upgrade() {
                        part.run(doc, value);
                    }
                },
                false,
            )
            .and_then(|watcher| watcher.start_watching(doc, target));
        if let Err(err) = started {
            doc.report_error(err);
            return;
        }
        self.target.set(Some(target));
        *self.watcher.borrow_mut() = Some(watcher);
    }

    fn disconnected(&self, _doc: &Document, _node: NodeId, _former_path: &[NodeId]) {
        if let Some(mut watcher) = self.watcher.borrow_mut().take() {
            watcher.stop_watching();
        }
        self.target.set(None);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn std::any::Any> {
        self
    }
}
