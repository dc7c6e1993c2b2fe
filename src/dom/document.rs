//! The host document.
//!
//! [`Document`] owns the element tree and plays the part a browser plays for
//! custom elements: it upgrades nodes whose tag has a registered definition,
//! delivers connect/disconnect/attribute-change callbacks, routes bubbling
//! events to listeners, and queues mutation records for observers until
//! [`Document::flush`] delivers them.
//!
//! The handle is a cheap `Rc` clone. Every method releases its internal
//! borrows before calling into element callbacks, listeners or observers, so
//! those may re-enter the document freely.

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::future::Future;
use std::rc::{Rc, Weak};

use slotmap::SecondaryMap;

use super::lifecycle::LifecycleTracker;
use super::node::{is_custom_tag, NodeData, NodeId};
use super::query::Selector;
use super::registry::{CustomElement, ElementDefinition, ElementRegistry};
use super::tree::Tree;
use crate::config::RuntimeConfig;
use crate::error::{Error, MarkupError, SelectorError};
use crate::event::{Event, ListenerId, ListenerTable};
use crate::markup::{self, MarkupNode};
use crate::observe::mutation::{
    MutationKind, MutationRecord, ObserveOptions, ObserverId, ObserverTable,
};
use crate::parts::script::{ScriptCall, ScriptHandler, ScriptRegistry};
use crate::timing::Scheduler;

struct Inner {
    config: RuntimeConfig,
    body: NodeId,
    tree: RefCell<Tree>,
    registry: RefCell<ElementRegistry>,
    elements: RefCell<SecondaryMap<NodeId, Rc<dyn CustomElement>>>,
    lifecycle: RefCell<LifecycleTracker>,
    listeners: RefCell<ListenerTable>,
    observers: RefCell<ObserverTable>,
    scripts: RefCell<ScriptRegistry>,
    errors: RefCell<Vec<Error>>,
    scheduler: Scheduler,
}

/// Shared handle to one element tree and its custom-element machinery.
#[derive(Clone)]
pub struct Document {
    inner: Rc<Inner>,
}

/// Non-owning handle, held by timers and callbacks that must not keep the
/// document alive.
#[derive(Clone)]
pub struct WeakDocument {
    inner: Weak<Inner>,
}

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.inner.upgrade().map(|inner| Document { inner })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("body", &self.inner.body)
            .field("nodes", &self.inner.tree.borrow().len())
            .field("definitions", &self.inner.registry.borrow().tags())
            .finish()
    }
}

impl Document {
    /// Create a document with the default [`RuntimeConfig`].
    pub fn new() -> Self {
        Self::with_config(RuntimeConfig::default())
    }

    /// Create a document whose root element is `config.root_tag`.
    pub fn with_config(config: RuntimeConfig) -> Self {
        let mut tree = Tree::new();
        let body = tree.insert(NodeData::element(config.root_tag.as_str()));
        Self {
            inner: Rc::new(Inner {
                config,
                body,
                tree: RefCell::new(tree),
                registry: RefCell::new(ElementRegistry::new()),
                elements: RefCell::new(SecondaryMap::new()),
                lifecycle: RefCell::new(LifecycleTracker::new()),
                listeners: RefCell::new(ListenerTable::new()),
                observers: RefCell::new(ObserverTable::default()),
                scripts: RefCell::new(ScriptRegistry::new()),
                errors: RefCell::new(Vec::new()),
                scheduler: Scheduler::new(),
            }),
        }
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// The root element.
    pub fn body(&self) -> NodeId {
        self.inner.body
    }

    /// The task set debounced behaviors run on.
    pub fn scheduler(&self) -> &Scheduler {
        &self.inner.scheduler
    }

    /// Drive scheduled behavior tasks until `future` completes.
    ///
    /// Events may be dispatched without a runtime; their debounced work
    /// waits here until the host runs the document.
    pub async fn run_until<F: Future>(&self, future: F) -> F::Output {
        self.inner.scheduler.run_until(future).await
    }

    /// Borrow the tree for reading. Do not hold the guard across calls that
    /// mutate the document.
    pub fn tree(&self) -> Ref<'_, Tree> {
        self.inner.tree.borrow()
    }

    // ── Definitions ──────────────────────────────────────────────────

    /// Register an element definition and upgrade every connected node that
    /// already carries its tag.
    ///
    /// Returns `false` if the tag was already defined; the existing
    /// definition stays in place.
    pub fn define(&self, definition: Rc<dyn ElementDefinition>) -> bool {
        let tag = definition.tag().to_owned();
        if !self.inner.registry.borrow_mut().define(definition) {
            tracing::debug!(tag = %tag, "element already defined");
            return false;
        }
        tracing::debug!(tag = %tag, "element defined");

        let pending: Vec<NodeId> = {
            let tree = self.inner.tree.borrow();
            tree.query_by_tag(self.inner.body, &tag)
        };
        for node in pending {
            if self.try_upgrade(node) && self.is_connected(node) {
                self.connect_one(node);
            }
        }
        true
    }

    pub fn is_defined(&self, tag: &str) -> bool {
        self.inner.registry.borrow().contains(tag)
    }

    pub fn definition(&self, tag: &str) -> Option<Rc<dyn ElementDefinition>> {
        self.inner.registry.borrow().get(tag)
    }

    /// The upgraded element living on `node`, if any.
    pub fn element(&self, node: NodeId) -> Option<Rc<dyn CustomElement>> {
        self.inner.elements.borrow().get(node).cloned()
    }

    /// The element on `node`, downcast to its concrete type.
    pub fn element_as<T: CustomElement>(&self, node: NodeId) -> Option<Rc<T>> {
        let element = self.element(node)?;
        if !element.as_any().is::<T>() {
            return None;
        }
        let any: Rc<dyn Any> = element.into_any();
        any.downcast::<T>().ok()
    }

    /// Whether the element on `node` has had its connect callback delivered
    /// and not yet its disconnect callback.
    pub fn is_attached(&self, node: NodeId) -> bool {
        self.inner.lifecycle.borrow().is_connected(node)
    }

    /// Number of elements currently attached.
    pub fn attached_count(&self) -> usize {
        self.inner.lifecycle.borrow().connected_count()
    }

    fn try_upgrade(&self, node: NodeId) -> bool {
        if self.inner.elements.borrow().contains_key(node) {
            return false;
        }
        let Some(tag) = self.tag(node) else {
            return false;
        };
        if !is_custom_tag(&tag) {
            return false;
        }
        let Some(definition) = self.definition(&tag) else {
            return false;
        };
        let element = definition.construct(self, node);
        self.inner.elements.borrow_mut().insert(node, element);
        tracing::trace!(tag = %tag, ?node, "element upgraded");
        true
    }

    // ── Reading ──────────────────────────────────────────────────────

    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().contains(node)
    }

    /// Whether `node` descends from the body.
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().is_connected(node)
    }

    pub fn tag(&self, node: NodeId) -> Option<String> {
        self.inner.tree.borrow().get(node)?.tag().map(str::to_owned)
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        self.inner.tree.borrow().get(node).is_some_and(NodeData::is_text)
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.inner.tree.borrow().get(node)?.attribute(name).map(str::to_owned)
    }

    pub fn has_attribute(&self, node: NodeId, name: &str) -> bool {
        self.inner
            .tree
            .borrow()
            .get(node)
            .is_some_and(|data| data.has_attribute(name))
    }

    /// All attributes of `node` as `(name, value)` pairs.
    pub fn attributes(&self, node: NodeId) -> Vec<(String, String)> {
        self.inner
            .tree
            .borrow()
            .get(node)
            .map(|data| {
                data.attributes()
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.inner.tree.borrow().parent(node)
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.inner.tree.borrow().children(node).to_vec()
    }

    pub fn text_content(&self, node: NodeId) -> String {
        self.inner.tree.borrow().text_content(node)
    }

    pub fn inner_markup(&self, node: NodeId) -> String {
        markup::inner_markup(&self.inner.tree.borrow(), node)
    }

    pub fn outer_markup(&self, node: NodeId) -> String {
        markup::outer_markup(&self.inner.tree.borrow(), node)
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.inner.tree.borrow().query_selector(scope, &selector))
    }

    /// Every descendant of `scope` matching `selector`, in tree order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, SelectorError> {
        let selector = Selector::parse(selector)?;
        Ok(self.inner.tree.borrow().query_selector_all(scope, &selector))
    }

    // ── Creating nodes ───────────────────────────────────────────────

    /// Create a parentless element, upgrading it at once if its tag is defined.
    pub fn create_element(&self, tag: &str) -> NodeId {
        let node = self.inner.tree.borrow_mut().create(NodeData::element(tag));
        self.try_upgrade(node);
        node
    }

    /// Create a parentless text node.
    pub fn create_text(&self, text: impl Into<String>) -> NodeId {
        self.inner.tree.borrow_mut().create(NodeData::text(text))
    }

    /// Build a detached subtree from parsed markup. Elements are upgraded
    /// once their attributes are in place.
    fn build(&self, node: &MarkupNode, slot: Option<&str>) -> NodeId {
        match node {
            MarkupNode::Text(text) => self.create_text(text.as_str()),
            MarkupNode::Element {
                tag,
                attributes,
                children,
            } => {
                let mut data = NodeData::element(tag.as_str());
                for (name, value) in attributes {
                    data.set_attribute(name, value.clone());
                }
                if let Some(slot) = slot {
                    data.set_attribute("slot", slot.to_owned());
                }
                let id = self.inner.tree.borrow_mut().create(data);
                for child in children {
                    let child = self.build(child, None);
                    self.inner.tree.borrow_mut().append(id, child);
                }
                self.try_upgrade(id);
                id
            }
        }
    }

    // ── Tree mutation ────────────────────────────────────────────────

    /// Append `child` to `parent`, moving it if it already has a parent.
    pub fn append_child(&self, parent: NodeId, child: NodeId) {
        self.insert_at(parent, usize::MAX, child);
    }

    /// Insert `child` as child number `index` of `parent` (clamped).
    ///
    /// A node that already has a parent is removed first, so moving a
    /// connected node disconnects and reconnects it. Attempts to insert a
    /// node beneath itself are ignored.
    pub fn insert_at(&self, parent: NodeId, index: usize, child: NodeId) {
        {
            let tree = self.inner.tree.borrow();
            if !tree.contains(parent) || !tree.contains(child) {
                tracing::warn!(?parent, ?child, "insert on a missing node ignored");
                return;
            }
            if child == parent || tree.is_ancestor(child, parent) {
                tracing::warn!(?parent, ?child, "insert beneath itself ignored");
                return;
            }
        }
        if self.parent(child).is_some() {
            self.remove_child(child);
        }
        let old_text = self.is_text(child).then(|| self.text_content(parent));
        self.inner.tree.borrow_mut().insert_at(parent, index, child);
        self.record_child_list(parent, vec![child], Vec::new(), old_text);
        if self.is_connected(parent) {
            self.connect_subtree(child);
        }
    }

    /// Detach `child` from its parent, keeping the subtree alive.
    ///
    /// Returns `false` if the node had no parent.
    pub fn remove_child(&self, child: NodeId) -> bool {
        let Some(parent) = self.parent(child) else {
            return false;
        };
        let old_text = self.is_text(child).then(|| self.text_content(parent));
        let was_connected = self.is_connected(child);
        let former_path = self.inner.tree.borrow().ancestors(child);
        self.inner.tree.borrow_mut().detach(child);
        self.record_child_list(parent, Vec::new(), vec![child], old_text);
        if was_connected {
            self.disconnect_subtree(child, &former_path);
        }
        true
    }

    /// Remove `node` from its parent and drop it and its descendants,
    /// including their elements and listeners.
    pub fn destroy(&self, node: NodeId) {
        if !self.contains(node) {
            return;
        }
        self.remove_child(node);
        self.drop_subtree(node);
    }

    /// Replace the children of `node` with a single text node (none when
    /// `text` is empty).
    pub fn set_text_content(&self, node: NodeId, text: &str) {
        if !self.contains(node) {
            return;
        }
        let removed = self.children(node);
        let old_text = self.text_content(node);
        let removed_text_only = removed.iter().all(|&c| self.is_text(c));
        self.discard_children(&removed);

        let mut added = Vec::new();
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.inner.tree.borrow_mut().append(node, text_node);
            added.push(text_node);
        }
        if added.is_empty() && removed.is_empty() {
            return;
        }
        let text_only = removed_text_only;
        self.push_record(MutationRecord {
            kind: MutationKind::ChildList {
                added,
                removed,
                text_only,
            },
            target: node,
            old_value: text_only.then_some(old_text),
            value: text_only.then(|| text.to_owned()),
        });
    }

    /// Replace the payload of a text node in place.
    pub fn set_text_data(&self, node: NodeId, text: &str) -> bool {
        let old = {
            let mut tree = self.inner.tree.borrow_mut();
            let Some(data) = tree.get_mut(node) else {
                return false;
            };
            data.set_text_data(text.to_owned())
        };
        let Some(old) = old else {
            return false;
        };
        self.push_record(MutationRecord {
            kind: MutationKind::CharacterData,
            target: node,
            old_value: Some(old),
            value: Some(text.to_owned()),
        });
        true
    }

    /// Replace every child of `node` with parsed markup.
    ///
    /// Nothing changes when the markup does not parse.
    pub fn set_inner_markup(&self, node: NodeId, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        let old = self.children(node);
        self.replace_nodes(node, &old, 0, markup, None)
    }

    /// Parse `markup` and append the resulting nodes to `parent`.
    pub fn append_markup(&self, parent: NodeId, markup: &str) -> Result<Vec<NodeId>, MarkupError> {
        self.replace_nodes(parent, &[], usize::MAX, markup, None)
    }

    /// Parse `markup` and insert the resulting nodes at `index` of `parent`.
    pub fn insert_markup(
        &self,
        parent: NodeId,
        index: usize,
        markup: &str,
    ) -> Result<Vec<NodeId>, MarkupError> {
        self.replace_nodes(parent, &[], index, markup, None)
    }

    /// Drop the children `old` of `parent`, then insert parsed `markup` at
    /// `index`, all as one child-list change. Top-level elements get a `slot`
    /// attribute when one is given.
    pub(crate) fn replace_nodes(
        &self,
        parent: NodeId,
        old: &[NodeId],
        index: usize,
        markup: &str,
        slot: Option<&str>,
    ) -> Result<Vec<NodeId>, MarkupError> {
        let parsed = markup::parse_markup(markup)?;
        if !self.contains(parent) {
            return Ok(Vec::new());
        }
        let old: Vec<NodeId> = old
            .iter()
            .copied()
            .filter(|&n| self.parent(n) == Some(parent))
            .collect();
        let old_text = self.text_content(parent);
        let text_only = old.iter().all(|&n| self.is_text(n))
            && parsed.iter().all(|n| matches!(n, MarkupNode::Text(_)));
        self.discard_children(&old);

        let added: Vec<NodeId> = parsed.iter().map(|node| self.build(node, slot)).collect();
        {
            let mut tree = self.inner.tree.borrow_mut();
            let start = index.min(tree.children(parent).len());
            for (offset, &node) in added.iter().enumerate() {
                tree.insert_at(parent, start + offset, node);
            }
        }
        if !added.is_empty() || !old.is_empty() {
            self.push_record(MutationRecord {
                kind: MutationKind::ChildList {
                    added: added.clone(),
                    removed: old,
                    text_only,
                },
                target: parent,
                old_value: text_only.then_some(old_text),
                value: text_only.then(|| self.text_content(parent)),
            });
        }
        if self.is_connected(parent) {
            for &node in &added {
                self.connect_subtree(node);
            }
        }
        Ok(added)
    }

    /// Detach and drop `nodes` without queueing records.
    fn discard_children(&self, nodes: &[NodeId]) {
        for &node in nodes {
            let was_connected = self.is_connected(node);
            let former_path = self.inner.tree.borrow().ancestors(node);
            self.inner.tree.borrow_mut().detach(node);
            if was_connected {
                self.disconnect_subtree(node, &former_path);
            }
            self.drop_subtree(node);
        }
    }

    fn drop_subtree(&self, node: NodeId) {
        let nodes = self.inner.tree.borrow().walk_depth_first(node);
        self.inner.tree.borrow_mut().remove(node);
        let mut dropped = Vec::new();
        {
            let mut elements = self.inner.elements.borrow_mut();
            let mut listeners = self.inner.listeners.borrow_mut();
            let mut lifecycle = self.inner.lifecycle.borrow_mut();
            let mut observers = self.inner.observers.borrow_mut();
            for &id in &nodes {
                dropped.extend(elements.remove(id));
                listeners.clear_node(id);
                lifecycle.forget(id);
                observers.forget_target(id);
            }
        }
        // Element drops may call back into the document.
        drop(dropped);
    }

    fn record_child_list(
        &self,
        parent: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        old_text: Option<String>,
    ) {
        let text_only = old_text.is_some();
        let value = text_only.then(|| self.text_content(parent));
        self.push_record(MutationRecord {
            kind: MutationKind::ChildList {
                added,
                removed,
                text_only,
            },
            target: parent,
            old_value: old_text,
            value,
        });
    }

    // ── Lifecycle dispatch ───────────────────────────────────────────

    /// Deliver connect callbacks for `root` and its descendants in tree
    /// order. Nodes moved away or dropped by an earlier callback are skipped.
    fn connect_subtree(&self, root: NodeId) {
        let nodes = self.inner.tree.borrow().walk_depth_first(root);
        for node in nodes {
            if !self.is_connected(node) {
                continue;
            }
            self.try_upgrade(node);
            self.connect_one(node);
        }
    }

    fn connect_one(&self, node: NodeId) {
        let Some(element) = self.element(node) else {
            return;
        };
        if !self.inner.lifecycle.borrow_mut().on_connect(node) {
            return;
        }
        tracing::debug!(?node, "element connected");
        element.connected(self, node);
    }

    fn disconnect_subtree(&self, root: NodeId, former_path: &[NodeId]) {
        let nodes = self.inner.tree.borrow().walk_depth_first(root);
        for node in nodes {
            let Some(element) = self.element(node) else {
                continue;
            };
            if !self.inner.lifecycle.borrow_mut().on_disconnect(node) {
                continue;
            }
            let mut path = self.inner.tree.borrow().ancestors(node);
            path.extend_from_slice(former_path);
            tracing::debug!(?node, "element disconnected");
            element.disconnected(self, node, &path);
        }
    }

    // ── Attributes ───────────────────────────────────────────────────

    /// Set an attribute. Names are lowercased.
    ///
    /// Queues an attribute record and, when the name is observed by the
    /// node's definition, calls the element's attribute-change callback.
    pub fn set_attribute(&self, node: NodeId, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let old = {
            let mut tree = self.inner.tree.borrow_mut();
            let Some(data) = tree.get_mut(node).filter(|data| data.is_element()) else {
                return;
            };
            data.set_attribute(&name, value.clone())
        };
        self.push_record(MutationRecord {
            kind: MutationKind::Attributes { name: name.clone() },
            target: node,
            old_value: old.clone(),
            value: Some(value.clone()),
        });
        self.attribute_reaction(node, &name, old.as_deref(), Some(&value));
    }

    /// Remove an attribute, returning its former value.
    pub fn remove_attribute(&self, node: NodeId, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let old = self.inner.tree.borrow_mut().get_mut(node)?.remove_attribute(&name)?;
        self.push_record(MutationRecord {
            kind: MutationKind::Attributes { name: name.clone() },
            target: node,
            old_value: Some(old.clone()),
            value: None,
        });
        self.attribute_reaction(node, &name, Some(&old), None);
        Some(old)
    }

    fn attribute_reaction(&self, node: NodeId, name: &str, old: Option<&str>, new: Option<&str>) {
        let Some(element) = self.element(node) else {
            return;
        };
        let observed = self
            .tag(node)
            .and_then(|tag| self.definition(&tag))
            .is_some_and(|def| def.observed_attributes().iter().any(|n| n == name));
        if !observed {
            return;
        }
        element.attribute_changed(self, node, name, old, new);
    }

    // ── Events ───────────────────────────────────────────────────────

    /// Listen for `event` on `node`.
    pub fn add_event_listener(
        &self,
        node: NodeId,
        event: &str,
        listener: impl Fn(&Document, &Event) + 'static,
    ) -> ListenerId {
        self.inner
            .listeners
            .borrow_mut()
            .add(node, event, Rc::new(listener))
    }

    /// Remove one listener. Returns `false` if it was already gone.
    pub fn remove_event_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow_mut().remove(id)
    }

    /// Number of listeners on `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.inner.listeners.borrow().count(node)
    }

    /// Number of listeners in the whole document.
    pub fn total_listener_count(&self) -> usize {
        self.inner.listeners.borrow().total()
    }

    /// Dispatch `event` at its target, then up the ancestor path when it
    /// bubbles. Returns how many listeners ran.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        let path = ListenerTable::bubble_path(&self.inner.tree.borrow(), event.target);
        self.dispatch_event_along(event, &path)
    }

    /// Dispatch `event` along an explicit path, target first. Used for
    /// nodes that have already left the tree.
    pub fn dispatch_event_along(&self, event: &Event, path: &[NodeId]) -> usize {
        let mut invoked = 0;
        for &node in path {
            let listeners = self.inner.listeners.borrow().listeners_for(node, &event.name);
            event.set_current_target(node);
            for (id, listener) in listeners {
                // A listener earlier in this round may have removed it.
                if !self.inner.listeners.borrow().contains(id) {
                    continue;
                }
                listener(self, event);
                invoked += 1;
            }
            if !event.bubbles || event.is_propagation_stopped() {
                break;
            }
        }
        tracing::trace!(event = %event.name, invoked, "event dispatched");
        invoked
    }

    // ── Mutation observers ───────────────────────────────────────────

    /// Create an observer. It hears nothing until [`Document::observe`].
    pub fn create_observer(
        &self,
        callback: impl Fn(&Document, &[MutationRecord]) + 'static,
    ) -> ObserverId {
        self.inner.observers.borrow_mut().create(Rc::new(callback))
    }

    /// Register `target` with an observer.
    pub fn observe(&self, id: ObserverId, target: NodeId, options: ObserveOptions) -> bool {
        self.inner.observers.borrow_mut().observe(id, target, options)
    }

    /// Drop an observer and its undelivered records.
    pub fn disconnect_observer(&self, id: ObserverId) -> bool {
        self.inner.observers.borrow_mut().disconnect(id)
    }

    /// Number of live observers.
    pub fn observer_count(&self) -> usize {
        self.inner.observers.borrow().len()
    }

    pub fn has_pending_records(&self) -> bool {
        self.inner.observers.borrow().has_pending()
    }

    /// Deliver queued records, repeating until observers stop producing
    /// new ones. Returns the number of records delivered.
    pub fn flush(&self) -> usize {
        let mut delivered = 0;
        loop {
            let batches = self.inner.observers.borrow_mut().take_batches();
            if batches.is_empty() {
                break;
            }
            for (id, callback, records) in batches {
                if !self.inner.observers.borrow().contains(id) {
                    continue;
                }
                tracing::trace!(observer = ?id, records = records.len(), "mutation batch");
                delivered += records.len();
                callback(self, &records);
            }
        }
        delivered
    }

    fn push_record(&self, record: MutationRecord) {
        let tree = self.inner.tree.borrow();
        self.inner.observers.borrow_mut().enqueue(&tree, &record);
    }

    // ── Scripts and errors ───────────────────────────────────────────

    /// Register a named script handler.
    ///
    /// Returns `false` and keeps the existing handler if the name is taken.
    pub fn register_script(
        &self,
        name: &str,
        handler: impl Fn(&ScriptCall<'_>) -> Result<(), crate::error::ScriptError> + 'static,
    ) -> bool {
        self.inner.scripts.borrow_mut().register(name, Rc::new(handler))
    }

    pub fn script(&self, name: &str) -> Option<ScriptHandler> {
        self.inner.scripts.borrow().get(name)
    }

    /// Record a runtime fault raised by a behavior.
    pub fn report_error(&self, error: impl Into<Error>) {
        let error = error.into();
        tracing::error!(error = %error, "behavior fault");
        self.inner.errors.borrow_mut().push(error);
    }

    /// Drain the reported faults.
    pub fn take_errors(&self) -> Vec<Error> {
        std::mem::take(&mut *self.inner.errors.borrow_mut())
    }

    pub fn error_count(&self) -> usize {
        self.inner.errors.borrow().len()
    }
}
