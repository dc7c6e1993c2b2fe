//! `on-event`: run a script, debounced, when named events reach a target.
//!
//! ```text
//! <todo-item>
//!   <on-event on="click keyup" target="button">save-item</on-event>
//! </todo-item>
//! ```
//!
//! The target defaults to the governing element; `target` is a selector
//! resolved inside it. Each event name gets its own listener, and detachment
//! removes exactly those listeners and drops any pending run.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::governing_element;
use super::script::{ScriptArg, ScriptBehavior};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::CustomElement;
use crate::event::{Event, ListenerId};
use crate::timing::Debouncer;

pub struct OnEvent {
    this: Weak<OnEvent>,
    script: ScriptBehavior,
    target: Cell<Option<NodeId>>,
    listeners: RefCell<Vec<ListenerId>>,
    debouncer: RefCell<Option<Debouncer<Event>>>,
}

impl OnEvent {
    pub fn new() -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: Weak::clone(this),
            script: ScriptBehavior::new(),
            target: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
            debouncer: RefCell::new(None),
        })
    }

    /// The governing element while attached.
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    /// Number of listeners this part holds.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.borrow().as_ref().is_some_and(Debouncer::is_pending)
    }

    fn run(&self, doc: &Document, event: Event) {
        let Some(target) = self.target.get() else {
            return;
        };
        if let Err(err) = self.script.execute(doc, target, Some(ScriptArg::Event(event))) {
            doc.report_error(err);
        }
        doc.flush();
    }

    /// Where listeners go: the governing element, or the `target` selector
    /// match inside it.
    fn listen_on(&self, doc: &Document, node: NodeId, governing: NodeId) -> Option<NodeId> {
        let Some(selector) = doc.attribute(node, "target") else {
            return Some(governing);
        };
        match doc.query_selector(governing, &selector) {
            Ok(Some(found)) => Some(found),
            Ok(None) => {
                tracing::debug!(selector = %selector, "on-event target not found");
                None
            }
            Err(err) => {
                doc.report_error(err);
                None
            }
        }
    }
}

impl CustomElement for OnEvent {
    fn connected(&self, doc: &Document, node: NodeId) {
        let Some(governing) = governing_element(doc, node) else {
            return;
        };
        let events: Vec<String> = doc
            .attribute(node, "on")
            .map(|on| on.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default();
        if events.is_empty() {
            tracing::debug!(?node, "on-event without event names");
            return;
        }
        let argument = doc.attribute(node, "argument").unwrap_or_else(|| "event".to_owned());
        if let Err(err) = self.script.compile(doc, node, Some(&argument)) {
            doc.report_error(err);
            return;
        }
        let Some(listen_on) = self.listen_on(doc, node, governing) else {
            return;
        };

        let debouncer = {
            let this = Weak::clone(&self.this);
            let weak_doc = doc.downgrade();
            Debouncer::new(doc.scheduler(), doc.config().debounce_window, move |event: Event| {
                if let (Some(part), Some(doc)) = (this.upgrade(), weak_doc.upgrade()) {
                    part.run(&doc, event);
                }
            })
        };
        *self.debouncer.borrow_mut() = Some(debouncer);
        self.target.set(Some(governing));

        let mut listeners = self.listeners.borrow_mut();
        for name in &events {
            let this = Weak::clone(&self.this);
            listeners.push(doc.add_event_listener(listen_on, name, move |_, event| {
                if let Some(part) = this.upgrade() {
                    if let Some(debouncer) = part.debouncer.borrow().as_ref() {
                        debouncer.call(event.clone());
                    }
                }
            }));
        }
    }

    fn disconnected(&self, doc: &Document, _node: NodeId, _former_path: &[NodeId]) {
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        for id in listeners {
            doc.remove_event_listener(id);
        }
        if let Some(debouncer) = self.debouncer.borrow_mut().take() {
            debouncer.cancel();
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

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::parts::definitions;

    fn setup(markup: &str, log: &Rc<RefCell<Vec<String>>>) -> (Document, NodeId) {
        let doc = Document::new();
        {
            let log = Rc::clone(log);
            doc.register_script("record", move |call| {
                let event = call.event().map(|e| e.name.clone()).unwrap_or_default();
                log.borrow_mut().push(format!("{} {event}", call.params.join(",")));
                Ok(())
            });
        }
        for definition in definitions() {
            doc.define(definition);
        }
        let item = doc.append_markup(doc.body(), markup).unwrap()[0];
        (doc, item)
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_collapse_to_one_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (doc, item) = setup(
            r#"<todo-item><on-event on="click keyup">record</on-event></todo-item>"#,
            &log,
        );
        doc.run_until(async {
            for name in ["click", "keyup", "click"] {
                doc.dispatch_event(&Event::new(name, item));
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            assert!(log.borrow().is_empty());
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert_eq!(*log.borrow(), ["event,component click"]);
        })
        .await;
    }

    #[tokio::test(start_paused = true)]
    async fn target_selector_and_custom_argument() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (doc, item) = setup(
            r#"<todo-item><button>save</button><on-event on="click" target="button" argument="e">record</on-event></todo-item>"#,
            &log,
        );
        let button = doc.children(item)[0];
        doc.dispatch_event(&Event::new("click", item));
        doc.dispatch_event(&Event::new("click", button));
        doc.run_until(tokio::time::sleep(Duration::from_millis(150))).await;
        assert_eq!(*log.borrow(), ["e,component click"]);
    }

    #[tokio::test(start_paused = true)]
    async fn detach_removes_listeners_and_cancels() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (doc, item) = setup(
            r#"<todo-item><on-event on="click keyup">record</on-event></todo-item>"#,
            &log,
        );
        let node = doc.children(item)[0];
        let part = doc.element_as::<OnEvent>(node).unwrap();
        assert_eq!(part.listener_count(), 2);
        assert_eq!(doc.listener_count(item), 2);

        doc.dispatch_event(&Event::new("click", item));
        assert!(part.is_pending());
        doc.remove_child(node);
        assert_eq!(doc.listener_count(item), 0);
        assert!(!part.is_pending());

        doc.run_until(tokio::time::sleep(Duration::from_millis(200))).await;
        assert!(log.borrow().is_empty());

        doc.append_child(item, node);
        assert_eq!(doc.listener_count(item), 2);
    }

    #[test]
    fn dispatch_without_a_runtime_queues_the_run() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let (doc, item) = setup(r#"<todo-item><on-event on="click">record</on-event></todo-item>"#, &log);
        let part = doc.element_as::<OnEvent>(doc.children(item)[0]).unwrap();

        doc.dispatch_event(&Event::new("click", item));
        assert!(part.is_pending());
        assert!(log.borrow().is_empty());

        tokio_test::block_on(doc.run_until(async {
            tokio::time::sleep(Duration::from_millis(150)).await;
        }));
        assert_eq!(*log.borrow(), ["event,component click"]);
        assert!(!part.is_pending());
    }
}
