//! Declarative subscription layer over host mutation records.
//!
//! A [`ChangeObserver`] collects interests (attribute names, child additions,
//! child removals, text changes), then [`start_watching`] folds them into a
//! single host observer on one node. Records arrive in delivery order and are
//! fanned out to the matching callback; records nobody asked for are skipped.
//!
//! [`start_watching`]: ChangeObserver::start_watching

use std::rc::Rc;

use crate::dom::document::{Document, WeakDocument};
use crate::dom::node::NodeId;
use crate::error::ObserveError;

use super::mutation::{MutationKind, MutationRecord, ObserveOptions, ObserverId};

/// Receives the current (or prior) value of an attribute or text payload.
pub type ValueCallback = Rc<dyn Fn(&Document, Option<&str>)>;

/// Receives the nodes added to or removed from the target.
pub type NodesCallback = Rc<dyn Fn(&Document, &[NodeId])>;

#[derive(Clone)]
struct ValueInterest {
    callback: ValueCallback,
    use_prior: bool,
}

impl ValueInterest {
    fn fire(&self, doc: &Document, old: Option<&str>, new: Option<&str>) {
        let value = if self.use_prior { old } else { new };
        (self.callback)(doc, value);
    }
}

#[derive(Clone, Default)]
struct Interests {
    attributes: Vec<(String, ValueInterest)>,
    child_added: Option<NodesCallback>,
    child_removed: Option<NodesCallback>,
    text: Option<ValueInterest>,
    include_children: bool,
}

impl Interests {
    fn attribute(&self, name: &str) -> Option<&ValueInterest> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, interest)| interest)
    }

    fn options(&self, target_is_text: bool) -> ObserveOptions {
        let mut options = ObserveOptions::default();
        if !self.attributes.is_empty() {
            options.attributes = true;
            options.attribute_filter =
                Some(self.attributes.iter().map(|(n, _)| n.clone()).collect());
            options.attribute_old_value = self.attributes.iter().any(|(_, i)| i.use_prior);
        }
        if self.child_added.is_some() || self.child_removed.is_some() {
            options.child_list = true;
        }
        if let Some(text) = &self.text {
            options.character_data = true;
            options.character_data_old_value = text.use_prior;
            // Text replacement shows up as child-list churn on the parent.
            options.child_list = true;
            if !target_is_text {
                options.subtree = true;
            }
        }
        if self.include_children {
            options.subtree = true;
        }
        options
    }

    fn dispatch(&self, doc: &Document, target: NodeId, records: &[MutationRecord]) {
        let mut index = 0;
        while index < records.len() {
            let record = &records[index];
            index += 1;
            let own = record.target == target || self.include_children;
            match &record.kind {
                MutationKind::Attributes { name } => {
                    if let Some(interest) = self.attribute(name).filter(|_| own) {
                        interest.fire(doc, record.old_value.as_deref(), record.value.as_deref());
                    }
                }
                MutationKind::CharacterData => {
                    if let Some(text) = &self.text {
                        text.fire(doc, record.old_value.as_deref(), record.value.as_deref());
                    }
                }
                MutationKind::ChildList {
                    added,
                    removed,
                    text_only,
                } => {
                    if let (true, Some(text)) = (*text_only, &self.text) {
                        let mut new = record.value.as_deref();
                        if added.is_empty() && !removed.is_empty() {
                            if let Some(next) = records.get(index).filter(|next| {
                                next.target == record.target
                                    && next.is_text_replacement()
                                    && next.removed_nodes().is_empty()
                                    && !next.added_nodes().is_empty()
                            }) {
                                new = next.value.as_deref();
                                index += 1;
                            }
                        }
                        text.fire(doc, record.old_value.as_deref(), new);
                        continue;
                    }
                    if !own {
                        continue;
                    }
                    if let Some(callback) = self.child_added.as_ref().filter(|_| !added.is_empty()) {
                        callback(doc, added);
                    }
                    if let Some(callback) =
                        self.child_removed.as_ref().filter(|_| !removed.is_empty())
                    {
                        callback(doc, removed);
                    }
                }
            }
        }
    }
}

struct Active {
    doc: WeakDocument,
    observer: ObserverId,
}

/// Builder-style subscription on one node.
///
/// ```ignore
/// let mut watcher = ChangeObserver::new();
/// watcher.watch_attribute("count", |_, v| println!("{v:?}"), false)?;
/// watcher.start_watching(&doc, node)?;
/// ```
#[derive(Default)]
pub struct ChangeObserver {
    interests: Interests,
    started: bool,
    active: Option<Active>,
}

impl ChangeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<(), ObserveError> {
        if self.started {
            return Err(ObserveError::AlreadyWatching);
        }
        Ok(())
    }

    /// Watch one attribute. With `use_prior_value` the callback receives the
    /// value before the change instead of after.
    ///
    /// Watching the same name again replaces the callback.
    pub fn watch_attribute(
        &mut self,
        name: &str,
        callback: impl Fn(&Document, Option<&str>) + 'static,
        use_prior_value: bool,
    ) -> Result<&mut Self, ObserveError> {
        self.ensure_open()?;
        let name = name.to_ascii_lowercase();
        let interest = ValueInterest {
            callback: Rc::new(callback),
            use_prior: use_prior_value,
        };
        match self.interests.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = interest,
            None => self.interests.attributes.push((name, interest)),
        }
        Ok(self)
    }

    pub fn watch_child_added(
        &mut self,
        callback: impl Fn(&Document, &[NodeId]) + 'static,
    ) -> Result<&mut Self, ObserveError> {
        self.ensure_open()?;
        self.interests.child_added = Some(Rc::new(callback));
        Ok(self)
    }

    pub fn watch_child_removed(
        &mut self,
        callback: impl Fn(&Document, &[NodeId]) + 'static,
    ) -> Result<&mut Self, ObserveError> {
        self.ensure_open()?;
        self.interests.child_removed = Some(Rc::new(callback));
        Ok(self)
    }

    /// Watch the target's text payload, however the host reports the change.
    pub fn watch_text(
        &mut self,
        callback: impl Fn(&Document, Option<&str>) + 'static,
        use_prior_value: bool,
    ) -> Result<&mut Self, ObserveError> {
        self.ensure_open()?;
        self.interests.text = Some(ValueInterest {
            callback: Rc::new(callback),
            use_prior: use_prior_value,
        });
        Ok(self)
    }

    /// Also deliver attribute and child changes from descendants.
    pub fn include_children(&mut self) -> Result<&mut Self, ObserveError> {
        self.ensure_open()?;
        self.interests.include_children = true;
        Ok(self)
    }

    /// Activate every registered interest on `node`. The interest set is
    /// frozen from here on.
    pub fn start_watching(&mut self, doc: &Document, node: NodeId) -> Result<(), ObserveError> {
        self.ensure_open()?;
        self.started = true;
        let interests = Rc::new(self.interests.clone());
        let options = interests.options(doc.is_text(node));
        let observer = doc.create_observer(move |doc, records| {
            interests.dispatch(doc, node, records);
        });
        doc.observe(observer, node, options);
        tracing::trace!(?node, ?observer, "change observer started");
        self.active = Some(Active {
            doc: doc.downgrade(),
            observer,
        });
        Ok(())
    }

    /// Release the host subscription. Safe to call more than once.
    pub fn stop_watching(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };
        if let Some(doc) = active.doc.upgrade() {
            doc.disconnect_observer(active.observer);
        }
    }

    pub fn is_watching(&self) -> bool {
        self.active.is_some()
    }
}

impl Drop for ChangeObserver {
    fn drop(&mut self) {
        self.stop_watching();
    }
}
