//! Listener table and bubble path computation.
//!
//! [`ListenerTable`] keeps per-node listeners in registration order. The
//! `bubble_path` static method computes the traversal order from a node up
//! to the tree root for bubble-phase delivery.

use std::rc::Rc;

use slotmap::SecondaryMap;

use super::message::Event;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::tree::Tree;

/// Shared event callback.
pub type Listener = Rc<dyn Fn(&Document, &Event)>;

/// Handle returned by [`ListenerTable::add`], used to remove exactly that
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

struct Entry {
    id: ListenerId,
    event: String,
    listener: Listener,
}

/// Per-node event listeners.
#[derive(Default)]
pub struct ListenerTable {
    next: u64,
    by_node: SecondaryMap<NodeId, Vec<Entry>>,
}

impl ListenerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener` for `event` on `node`.
    pub fn add(&mut self, node: NodeId, event: impl Into<String>, listener: Listener) -> ListenerId {
        self.next += 1;
        let id = ListenerId(self.next);
        let entry = Entry {
            id,
            event: event.into(),
            listener,
        };
        match self.by_node.get_mut(node) {
            Some(entries) => entries.push(entry),
            None => {
                self.by_node.insert(node, vec![entry]);
            }
        }
        id
    }

    /// Remove one registration. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        for entries in self.by_node.values_mut() {
            if let Some(index) = entries.iter().position(|e| e.id == id) {
                entries.remove(index);
                return true;
            }
        }
        false
    }

    /// Whether `id` is still registered.
    pub fn contains(&self, id: ListenerId) -> bool {
        self.by_node
            .values()
            .any(|entries| entries.iter().any(|e| e.id == id))
    }

    /// Snapshot of the listeners for `event` on `node`, in registration order.
    pub fn listeners_for(&self, node: NodeId, event: &str) -> Vec<(ListenerId, Listener)> {
        self.by_node
            .get(node)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|e| e.event == event)
                    .map(|e| (e.id, Rc::clone(&e.listener)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of listeners registered on `node`.
    pub fn count(&self, node: NodeId) -> usize {
        self.by_node.get(node).map_or(0, Vec::len)
    }

    /// Number of listeners across all nodes.
    pub fn total(&self) -> usize {
        self.by_node.values().map(Vec::len).sum()
    }

    /// Drop every listener on `node`.
    pub fn clear_node(&mut self, node: NodeId) -> usize {
        self.by_node.remove(node).map_or(0, |entries| entries.len())
    }

    /// Compute the bubble path from `start` up to the root (inclusive).
    ///
    /// Returns `[start, parent, grandparent, ..., root]`.
    /// If `start` does not exist in the tree, returns an empty vec.
    pub fn bubble_path(tree: &Tree, start: NodeId) -> Vec<NodeId> {
        if !tree.contains(start) {
            return Vec::new();
        }
        let mut path = vec![start];
        path.extend(tree.ancestors(start));
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;

    /// ```text
    ///       body
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Tree, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(NodeData::element("body"));
        let a = tree.insert_child(root, NodeData::element("todo-card"));
        let b = tree.insert_child(root, NodeData::element("div"));
        let c = tree.insert_child(a, NodeData::element("button"));
        let d = tree.insert_child(a, NodeData::text("label"));
        (tree, root, a, b, c, d)
    }

    fn noop() -> Listener {
        Rc::new(|_: &Document, _: &Event| {})
    }

    #[test]
    fn add_and_remove() {
        let (_, root, a, ..) = build_tree();
        let mut table = ListenerTable::new();
        let first = table.add(a, "click", noop());
        let second = table.add(a, "input", noop());
        table.add(root, "click", noop());

        assert_eq!(table.count(a), 2);
        assert_eq!(table.total(), 3);
        assert!(table.remove(first));
        assert!(!table.remove(first));
        assert!(!table.contains(first));
        assert!(table.contains(second));
        assert_eq!(table.count(a), 1);
    }

    #[test]
    fn listeners_for_filters_by_event_in_order() {
        let (_, _, a, ..) = build_tree();
        let mut table = ListenerTable::new();
        let x = table.add(a, "click", noop());
        table.add(a, "input", noop());
        let y = table.add(a, "click", noop());

        let ids: Vec<_> = table.listeners_for(a, "click").into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![x, y]);
        assert!(table.listeners_for(a, "keyup").is_empty());
    }

    #[test]
    fn clear_node_drops_everything_on_it() {
        let (_, root, a, ..) = build_tree();
        let mut table = ListenerTable::new();
        table.add(a, "click", noop());
        table.add(a, "input", noop());
        table.add(root, "click", noop());
        assert_eq!(table.clear_node(a), 2);
        assert_eq!(table.total(), 1);
    }

    #[test]
    fn bubble_path_from_leaf() {
        let (tree, root, a, _, c, _) = build_tree();
        assert_eq!(ListenerTable::bubble_path(&tree, c), vec![c, a, root]);
    }

    #[test]
    fn bubble_path_from_root() {
        let (tree, root, ..) = build_tree();
        assert_eq!(ListenerTable::bubble_path(&tree, root), vec![root]);
    }

    #[test]
    fn bubble_path_sibling() {
        let (tree, root, _, b, ..) = build_tree();
        assert_eq!(ListenerTable::bubble_path(&tree, b), vec![b, root]);
    }

    #[test]
    fn bubble_path_nonexistent_node() {
        let (mut tree, ..) = build_tree();
        let stale = tree.create(NodeData::element("ghost"));
        tree.remove(stale);
        assert!(ListenerTable::bubble_path(&tree, stale).is_empty());
    }
}
