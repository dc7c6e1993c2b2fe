//! Host mutation records and subscription options.
//!
//! The document queues a [`MutationRecord`] for every attribute, child-list
//! and character-data change and delivers them in batches on
//! [`Document::flush`](crate::dom::Document::flush), once per observer, in
//! the order the changes happened.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::tree::Tree;

/// Callback receiving one delivered batch.
pub type MutationCallback = Rc<dyn Fn(&Document, &[MutationRecord])>;

/// Handle of a host observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub(crate) u64);

/// What changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    /// An attribute was set or removed.
    Attributes { name: String },
    /// Children were added to or removed from the target.
    ///
    /// `text_only` is set when every added and removed node was a text node,
    /// i.e. the change replaced the target's text payload.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
        text_only: bool,
    },
    /// A text node's payload changed.
    CharacterData,
}

/// One change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
    /// Node the change happened on. For child-list records, the parent.
    pub target: NodeId,
    /// Value before the change: the attribute value, the text payload, or,
    /// for text-only child-list records, the target's former text content.
    /// `None` unless the observer asked for prior values.
    pub old_value: Option<String>,
    /// Value right after the change, in the same terms as `old_value`.
    pub value: Option<String>,
}

impl MutationRecord {
    pub fn attribute_name(&self) -> Option<&str> {
        match &self.kind {
            MutationKind::Attributes { name } => Some(name),
            _ => None,
        }
    }

    pub fn added_nodes(&self) -> &[NodeId] {
        match &self.kind {
            MutationKind::ChildList { added, .. } => added,
            _ => &[],
        }
    }

    pub fn removed_nodes(&self) -> &[NodeId] {
        match &self.kind {
            MutationKind::ChildList { removed, .. } => removed,
            _ => &[],
        }
    }

    /// Whether this child-list record only swapped text nodes.
    pub fn is_text_replacement(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList { text_only: true, .. })
    }
}

/// What one observer registration wants to hear about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub attributes: bool,
    /// Restrict attribute records to these names. `None` means all.
    pub attribute_filter: Option<Vec<String>>,
    pub attribute_old_value: bool,
    pub child_list: bool,
    pub character_data: bool,
    pub character_data_old_value: bool,
    /// Also report changes on descendants of the target.
    pub subtree: bool,
}

impl ObserveOptions {
    /// Whether a record of `kind` passes these options.
    pub fn accepts(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::Attributes { name } => {
                self.attributes
                    && self
                        .attribute_filter
                        .as_ref()
                        .is_none_or(|names| names.iter().any(|n| n == name))
            }
            MutationKind::ChildList { .. } => self.child_list,
            MutationKind::CharacterData => self.character_data,
        }
    }

    /// Whether prior values are kept for records of `kind`.
    pub fn wants_old_value(&self, kind: &MutationKind) -> bool {
        match kind {
            MutationKind::Attributes { .. } => self.attribute_old_value,
            MutationKind::CharacterData => self.character_data_old_value,
            MutationKind::ChildList { text_only, .. } => {
                *text_only && self.character_data_old_value
            }
        }
    }
}

struct Registration {
    target: NodeId,
    options: ObserveOptions,
}

struct ObserverEntry {
    callback: MutationCallback,
    registrations: Vec<Registration>,
    queue: Vec<MutationRecord>,
}

/// Host-side bookkeeping for every live observer: registrations and the
/// records queued for the next delivery.
#[derive(Default)]
pub(crate) struct ObserverTable {
    next: u64,
    entries: BTreeMap<ObserverId, ObserverEntry>,
}

impl ObserverTable {
    pub fn create(&mut self, callback: MutationCallback) -> ObserverId {
        self.next += 1;
        let id = ObserverId(self.next);
        self.entries.insert(
            id,
            ObserverEntry {
                callback,
                registrations: Vec::new(),
                queue: Vec::new(),
            },
        );
        id
    }

    /// Register `target`. Observing the same target again replaces its options.
    pub fn observe(&mut self, id: ObserverId, target: NodeId, options: ObserveOptions) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        match entry.registrations.iter_mut().find(|r| r.target == target) {
            Some(existing) => existing.options = options,
            None => entry.registrations.push(Registration { target, options }),
        }
        true
    }

    /// Drop the observer and any records it has not received yet.
    pub fn disconnect(&mut self, id: ObserverId) -> bool {
        self.entries.remove(&id).is_some()
    }

    pub fn contains(&self, id: ObserverId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop registrations on a destroyed node.
    pub fn forget_target(&mut self, target: NodeId) {
        for entry in self.entries.values_mut() {
            entry.registrations.retain(|r| r.target != target);
        }
    }

    /// Queue `record` for every observer with a matching registration.
    ///
    /// An observer receives a record at most once even if several of its
    /// registrations match.
    pub fn enqueue(&mut self, tree: &Tree, record: &MutationRecord) {
        let ancestors = tree.ancestors(record.target);
        for entry in self.entries.values_mut() {
            let matching = entry.registrations.iter().find(|r| {
                let in_scope = r.target == record.target
                    || (r.options.subtree && ancestors.contains(&r.target));
                in_scope && r.options.accepts(&record.kind)
            });
            if let Some(registration) = matching {
                let mut queued = record.clone();
                if !registration.options.wants_old_value(&record.kind) {
                    queued.old_value = None;
                }
                entry.queue.push(queued);
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.entries.values().any(|e| !e.queue.is_empty())
    }

    /// Take every non-empty queue, in observer creation order.
    pub fn take_batches(&mut self) -> Vec<(ObserverId, MutationCallback, Vec<MutationRecord>)> {
        self.entries
            .iter_mut()
            .filter(|(_, e)| !e.queue.is_empty())
            .map(|(id, e)| (*id, Rc::clone(&e.callback), std::mem::take(&mut e.queue)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn attr(name: &str) -> MutationKind {
        MutationKind::Attributes { name: name.into() }
    }

    #[test]
    fn attribute_filter() {
        let opts = ObserveOptions {
            attributes: true,
            attribute_filter: Some(vec!["count".into()]),
            ..Default::default()
        };
        assert!(opts.accepts(&attr("count")));
        assert!(!opts.accepts(&attr("title")));
        assert!(!opts.accepts(&MutationKind::CharacterData));

        let all = ObserveOptions {
            attributes: true,
            ..Default::default()
        };
        assert!(all.accepts(&attr("title")));
    }

    #[test]
    fn child_list_and_text() {
        let opts = ObserveOptions {
            child_list: true,
            character_data: true,
            character_data_old_value: true,
            ..Default::default()
        };
        let swap = MutationKind::ChildList {
            added: Vec::new(),
            removed: Vec::new(),
            text_only: true,
        };
        assert!(opts.accepts(&swap));
        assert!(opts.accepts(&MutationKind::CharacterData));
        assert!(opts.wants_old_value(&swap));
        assert!(!opts.wants_old_value(&attr("x")));
    }

    #[test]
    fn table_routes_records_to_matching_registrations() {
        use crate::dom::node::NodeData;

        let mut tree = Tree::new();
        let body = tree.insert(NodeData::element("body"));
        let card = tree.insert_child(body, NodeData::element("todo-card"));
        let item = tree.insert_child(card, NodeData::element("todo-item"));

        let mut table = ObserverTable::default();
        let noop: MutationCallback = Rc::new(|_: &Document, _: &[MutationRecord]| {});
        let direct = table.create(Rc::clone(&noop));
        let deep = table.create(noop);
        table.observe(
            direct,
            card,
            ObserveOptions {
                attributes: true,
                attribute_old_value: true,
                ..Default::default()
            },
        );
        table.observe(
            deep,
            body,
            ObserveOptions {
                attributes: true,
                subtree: true,
                ..Default::default()
            },
        );

        let on_item = MutationRecord {
            kind: attr("done"),
            target: item,
            old_value: Some("no".into()),
            value: Some("yes".into()),
        };
        table.enqueue(&tree, &on_item);
        let on_card = MutationRecord {
            target: card,
            ..on_item.clone()
        };
        table.enqueue(&tree, &on_card);

        let batches = table.take_batches();
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].0, direct);
        assert_eq!(batches[0].2, vec![on_card.clone()]);
        assert_eq!(batches[1].0, deep);
        assert_eq!(batches[1].2.len(), 2);
        assert_eq!(batches[1].2[0].old_value, None);
        assert!(!table.has_pending());

        assert!(table.disconnect(direct));
        assert!(!table.disconnect(direct));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn record_accessors() {
        let mut sm: SlotMap<NodeId, ()> = SlotMap::with_key();
        let target = sm.insert(());
        let child = sm.insert(());
        let record = MutationRecord {
            kind: MutationKind::ChildList {
                added: vec![child],
                removed: Vec::new(),
                text_only: false,
            },
            target,
            old_value: None,
            value: None,
        };
        assert_eq!(record.added_nodes(), [child]);
        assert!(record.removed_nodes().is_empty());
        assert!(!record.is_text_replacement());
        assert!(record.attribute_name().is_none());
    }
}
