//! Tree operations: insert, move, detach, remove, walk.

use std::collections::VecDeque;

use slotmap::{SecondaryMap, SlotMap};

use super::node::{NodeData, NodeId};

/// Empty slice constant for returning when a node has no children.
const EMPTY_CHILDREN: &[NodeId] = &[];

/// The element tree, backed by a slotmap arena.
///
/// All nodes live in a single `SlotMap`. Parent/child relationships are stored
/// in secondary maps so that node removal is O(subtree size) and lookup is O(1).
/// Nodes may exist in the arena without a parent: freshly created nodes and
/// detached subtrees are kept until [`Tree::remove`] drops them.
#[derive(Debug)]
pub struct Tree {
    pub(crate) nodes: SlotMap<NodeId, NodeData>,
    children: SecondaryMap<NodeId, Vec<NodeId>>,
    parent: SecondaryMap<NodeId, NodeId>,
    root: Option<NodeId>,
}

impl Tree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            children: SecondaryMap::new(),
            parent: SecondaryMap::new(),
            root: None,
        }
    }

    /// Insert a parentless node.
    ///
    /// If no root has been set yet, this node becomes the root.
    pub fn insert(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        if self.root.is_none() {
            self.root = Some(id);
        }
        id
    }

    /// Insert a parentless node without touching the root.
    pub fn create(&mut self, data: NodeData) -> NodeId {
        let id = self.nodes.insert(data);
        self.children.insert(id, Vec::new());
        id
    }

    /// Insert a new node as the last child of `parent`.
    ///
    /// # Panics
    ///
    /// Panics (debug) if `parent` does not exist in the tree.
    pub fn insert_child(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        debug_assert!(
            self.nodes.contains_key(parent),
            "parent node does not exist"
        );
        let id = self.create(data);
        self.append(parent, id);
        id
    }

    /// Attach an existing node as the last child of `parent`, detaching it
    /// from any previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        let len = self.children(parent).len();
        self.insert_at(parent, len, child);
    }

    /// Attach an existing node as child number `index` of `parent` (clamped
    /// to the child count), detaching it from any previous parent first.
    ///
    /// # Panics
    ///
    /// Panics (debug) if either node is missing or `child` is an ancestor of
    /// `parent`.
    pub fn insert_at(&mut self, parent: NodeId, index: usize, child: NodeId) {
        debug_assert!(self.nodes.contains_key(child), "node does not exist");
        debug_assert!(self.nodes.contains_key(parent), "parent does not exist");
        debug_assert!(
            child != parent && !self.ancestors(parent).contains(&child),
            "cannot attach a node beneath itself"
        );
        self.detach(child);
        self.parent.insert(child, parent);
        if let Some(siblings) = self.children.get_mut(parent) {
            let index = index.min(siblings.len());
            siblings.insert(index, child);
        }
    }

    /// Detach `id` from its parent, keeping the subtree in the arena.
    ///
    /// Returns the former parent, or `None` if the node had none.
    pub fn detach(&mut self, id: NodeId) -> Option<NodeId> {
        let parent_id = self.parent.remove(id)?;
        if let Some(siblings) = self.children.get_mut(parent_id) {
            siblings.retain(|&child| child != id);
        }
        Some(parent_id)
    }

    /// Remove a node and all its descendants from the arena.
    ///
    /// Returns the `NodeData` for the removed node, or `None` if it didn't exist.
    pub fn remove(&mut self, id: NodeId) -> Option<NodeData> {
        if !self.nodes.contains_key(id) {
            return None;
        }

        self.detach(id);

        if self.root == Some(id) {
            self.root = None;
        }

        // Collect all descendants (BFS) to remove them.
        let mut to_remove = VecDeque::new();
        to_remove.push_back(id);
        let mut removed_root_data = None;

        while let Some(current) = to_remove.pop_front() {
            if let Some(kids) = self.children.remove(current) {
                to_remove.extend(kids);
            }
            self.parent.remove(current);
            let data = self.nodes.remove(current);
            if current == id {
                removed_root_data = data;
            }
        }

        removed_root_data
    }

    /// Get the parent of a node, if it has one.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parent.get(id).copied()
    }

    /// Get the children of a node. Returns an empty slice if the node has no children
    /// or does not exist.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.children
            .get(id)
            .map(Vec::as_slice)
            .unwrap_or(EMPTY_CHILDREN)
    }

    /// Position of `id` among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    /// Walk from `id` up to the topmost ancestor, collecting ancestor node ids.
    ///
    /// The returned vec does **not** include `id` itself; it starts with the
    /// immediate parent.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut current = id;
        while let Some(p) = self.parent.get(current).copied() {
            result.push(p);
            current = p;
        }
        result
    }

    /// Whether `id` is the root or descends from it.
    pub fn is_connected(&self, id: NodeId) -> bool {
        let Some(root) = self.root else {
            return false;
        };
        id == root || self.ancestors(id).last() == Some(&root)
    }

    /// Whether `ancestor` is a strict ancestor of `id`.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// Concatenated text of every text node under `id` (inclusive), in tree order.
    pub fn text_content(&self, id: NodeId) -> String {
        self.walk_depth_first(id)
            .into_iter()
            .filter_map(|node| self.nodes.get(node).and_then(NodeData::text_data))
            .collect()
    }

    /// Immutable access to a node's data.
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id)
    }

    /// Mutable access to a node's data.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id)
    }

    /// The current root node, if set.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the arena, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether the arena contains a node with the given id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Pre-order depth-first traversal starting from `start`.
    pub fn walk_depth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack = vec![start];
        while let Some(current) = stack.pop() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            // Push children in reverse so the first child is visited first.
            for &child in self.children(current).iter().rev() {
                stack.push(child);
            }
        }
        result
    }

    /// Breadth-first traversal starting from `start`.
    pub fn walk_breadth_first(&self, start: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            if !self.nodes.contains_key(current) {
                continue;
            }
            result.push(current);
            queue.extend(self.children(current).iter().copied());
        }
        result
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a small test tree:
    /// ```text
    ///       root
    ///      /    \
    ///    a        b
    ///   / \
    ///  c   d
    /// ```
    fn build_tree() -> (Tree, NodeId, NodeId, NodeId, NodeId, NodeId) {
        let mut tree = Tree::new();
        let root = tree.insert(NodeData::element("body"));
        let a = tree.insert_child(root, NodeData::element("todo-card").with_attribute("id", "a"));
        let b = tree.insert_child(root, NodeData::element("div").with_attribute("id", "b"));
        let c = tree.insert_child(a, NodeData::element("button"));
        let d = tree.insert_child(a, NodeData::text("label"));
        (tree, root, a, b, c, d)
    }

    #[test]
    fn insert_sets_root() {
        let mut tree = Tree::new();
        let id = tree.insert(NodeData::element("body"));
        assert_eq!(tree.root(), Some(id));
        let other = tree.insert(NodeData::element("div"));
        assert_eq!(tree.root(), Some(id));
        assert!(!tree.is_connected(other));
    }

    #[test]
    fn create_does_not_set_root() {
        let mut tree = Tree::new();
        tree.create(NodeData::element("div"));
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn parent_and_children() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.parent(a), Some(root));
        assert_eq!(tree.parent(c), Some(a));
        assert_eq!(tree.parent(root), None);
        assert_eq!(tree.children(root), &[a, b]);
        assert_eq!(tree.children(a), &[c, d]);
        assert!(tree.children(c).is_empty());
    }

    #[test]
    fn ancestors_and_connection() {
        let (tree, root, a, _b, c, _d) = build_tree();
        assert_eq!(tree.ancestors(c), vec![a, root]);
        assert!(tree.ancestors(root).is_empty());
        assert!(tree.is_connected(c));
        assert!(tree.is_connected(root));
        assert!(tree.is_ancestor(root, c));
        assert!(!tree.is_ancestor(c, root));
    }

    #[test]
    fn insert_at_positions() {
        let (mut tree, root, a, b, ..) = build_tree();
        let first = tree.create(NodeData::element("header"));
        tree.insert_at(root, 0, first);
        assert_eq!(tree.children(root), &[first, a, b]);
        let last = tree.create(NodeData::element("footer"));
        tree.insert_at(root, 99, last);
        assert_eq!(tree.children(root), &[first, a, b, last]);
        assert_eq!(tree.index_of(b), Some(2));
    }

    #[test]
    fn detach_keeps_subtree() {
        let (mut tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.detach(a), Some(root));
        assert_eq!(tree.children(root), &[b]);
        assert!(tree.contains(a));
        assert_eq!(tree.children(a), &[c, d]);
        assert!(!tree.is_connected(c));
        assert_eq!(tree.detach(a), None);

        tree.append(root, a);
        assert!(tree.is_connected(c));
        assert_eq!(tree.children(root), &[b, a]);
    }

    #[test]
    fn remove_subtree() {
        let (mut tree, root, a, b, c, d) = build_tree();
        let removed = tree.remove(a);
        assert_eq!(removed.and_then(|data| data.tag().map(str::to_owned)).as_deref(), Some("todo-card"));
        assert!(!tree.contains(a));
        assert!(!tree.contains(c));
        assert!(!tree.contains(d));
        assert_eq!(tree.children(root), &[b]);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn remove_root() {
        let (mut tree, root, ..) = build_tree();
        tree.remove(root);
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }

    #[test]
    fn remove_nonexistent() {
        let mut tree = Tree::new();
        let id = tree.insert(NodeData::element("x"));
        tree.remove(id);
        assert!(tree.remove(id).is_none());
    }

    #[test]
    fn append_moves_existing_node() {
        let (mut tree, root, a, b, c, _d) = build_tree();
        tree.append(b, c);
        assert_eq!(tree.parent(c), Some(b));
        assert!(!tree.children(a).contains(&c));
        assert_eq!(tree.ancestors(c), vec![b, root]);
    }

    #[test]
    fn text_content_concatenates() {
        let (mut tree, root, _a, b, ..) = build_tree();
        tree.insert_child(b, NodeData::text(" more"));
        assert_eq!(tree.text_content(root), "label more");
    }

    #[test]
    fn walks() {
        let (tree, root, a, b, c, d) = build_tree();
        assert_eq!(tree.walk_depth_first(root), vec![root, a, c, d, b]);
        assert_eq!(tree.walk_breadth_first(root), vec![root, a, b, c, d]);
        assert_eq!(tree.walk_depth_first(a), vec![a, c, d]);
    }

    #[test]
    fn default_impl() {
        let tree = Tree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
    }
}
