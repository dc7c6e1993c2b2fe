//! Upward search over any tree that can report a parent and a tag name.
//!
//! Behaviors and components find their governing element by walking up from
//! themselves instead of being wired to it. The walk is written against the
//! [`TreeNode`] capability so it can run over the document arena or over a
//! throwaway test tree alike.

use super::node::{is_custom_tag, NodeId};
use super::tree::Tree;

/// The two capabilities an upward search needs.
pub trait TreeNode: Sized {
    /// The parent node, if any.
    fn parent_node(&self) -> Option<Self>;

    /// Tag name for elements, `None` for text and other non-element nodes.
    fn tag_name(&self) -> Option<&str>;
}

/// Nearest strict ancestor of `start` satisfying `predicate`.
///
/// The walk stops without a match when it reaches a node tagged `root_tag`
/// or runs out of parents. The root itself is never returned.
pub fn nearest_ancestor<N: TreeNode>(
    start: &N,
    root_tag: &str,
    mut predicate: impl FnMut(&N) -> bool,
) -> Option<N> {
    let mut current = start.parent_node();
    while let Some(node) = current {
        if node.tag_name() == Some(root_tag) {
            return None;
        }
        if predicate(&node) {
            return Some(node);
        }
        current = node.parent_node();
    }
    None
}

/// Nearest strict ancestor whose tag contains a hyphen.
pub fn nearest_custom_ancestor<N: TreeNode>(start: &N, root_tag: &str) -> Option<N> {
    nearest_ancestor(start, root_tag, |node| node.tag_name().is_some_and(is_custom_tag))
}

/// A borrowed cursor into a [`Tree`].
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    pub tree: &'a Tree,
    pub id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }
}

impl TreeNode for NodeRef<'_> {
    fn parent_node(&self) -> Option<Self> {
        self.tree.parent(self.id).map(|id| Self { tree: self.tree, id })
    }

    fn tag_name(&self) -> Option<&str> {
        self.tree.get(self.id).and_then(|data| data.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;

    /// Minimal tree used to check the search is independent of the arena.
    #[derive(Debug, Clone)]
    struct Chain {
        tags: Vec<&'static str>,
        index: usize,
    }

    impl TreeNode for Chain {
        fn parent_node(&self) -> Option<Self> {
            (self.index > 0).then(|| Self {
                tags: self.tags.clone(),
                index: self.index - 1,
            })
        }

        fn tag_name(&self) -> Option<&str> {
            Some(self.tags[self.index])
        }
    }

    fn chain(tags: &[&'static str]) -> Chain {
        Chain {
            tags: tags.to_vec(),
            index: tags.len() - 1,
        }
    }

    #[test]
    fn finds_nearest_hyphenated_ancestor() {
        let leaf = chain(&["body", "todo-card", "todo-item", "div", "span", "on-event"]);
        let found = nearest_custom_ancestor(&leaf, "body").unwrap();
        assert_eq!(found.tag_name(), Some("todo-item"));
    }

    #[test]
    fn never_skips_past_the_nearest() {
        let leaf = chain(&["body", "outer-card", "inner-item", "property-input"]);
        let found = nearest_custom_ancestor(&leaf, "body").unwrap();
        assert_eq!(found.tag_name(), Some("inner-item"));
    }

    #[test]
    fn stops_at_root_tag() {
        let leaf = chain(&["app-shell", "body", "div", "script-part"]);
        assert!(nearest_custom_ancestor(&leaf, "body").is_none());
    }

    #[test]
    fn runs_out_of_parents() {
        let leaf = chain(&["div", "p", "on-event"]);
        assert!(nearest_custom_ancestor(&leaf, "body").is_none());
    }

    #[test]
    fn predicate_filters_hyphenated_candidates() {
        let leaf = chain(&["body", "todo-card", "todo-item", "on-event"]);
        let found = nearest_ancestor(&leaf, "body", |n| n.tag_name() == Some("todo-card"));
        assert_eq!(found.unwrap().index, 1);
    }

    #[test]
    fn works_over_the_arena() {
        let mut tree = Tree::new();
        let body = tree.insert(NodeData::element("body"));
        let card = tree.insert_child(body, NodeData::element("todo-card"));
        let wrapper = tree.insert_child(card, NodeData::element("section"));
        let part = tree.insert_child(wrapper, NodeData::element("on-event"));
        let found = nearest_custom_ancestor(&NodeRef::new(&tree, part), "body");
        assert_eq!(found.map(|n| n.id), Some(card));
    }
}
