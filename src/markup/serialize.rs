//! Markup serialization of arena subtrees.

use std::fmt::Write;

use super::parser::{is_raw_text, is_void};
use super::tokenizer::{escape_attribute, escape_text};
use crate::dom::node::{NodeId, NodeKind};
use crate::dom::tree::Tree;

/// Serialize `id` and its subtree.
pub fn outer_markup(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    write_node(tree, id, false, &mut out);
    out
}

/// Serialize the children of `id`.
pub fn inner_markup(tree: &Tree, id: NodeId) -> String {
    let raw = tree.get(id).and_then(|d| d.tag()).is_some_and(is_raw_text);
    let mut out = String::new();
    for &child in tree.children(id) {
        write_node(tree, child, raw, &mut out);
    }
    out
}

fn write_node(tree: &Tree, id: NodeId, raw: bool, out: &mut String) {
    let Some(data) = tree.get(id) else {
        return;
    };
    match &data.kind {
        NodeKind::Text(text) if raw => out.push_str(text),
        NodeKind::Text(text) => out.push_str(&escape_text(text)),
        NodeKind::Element { tag, attributes } => {
            out.push('<');
            out.push_str(tag);
            for attribute in attributes {
                if attribute.value.is_empty() {
                    let _ = write!(out, " {}", attribute.name);
                } else {
                    let _ = write!(
                        out,
                        " {}=\"{}\"",
                        attribute.name,
                        escape_attribute(&attribute.value)
                    );
                }
            }
            out.push('>');
            if is_void(tag) {
                return;
            }
            let raw = is_raw_text(tag);
            for &child in tree.children(id) {
                write_node(tree, child, raw, out);
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::node::NodeData;

    #[test]
    fn serializes_nested_elements() {
        let mut tree = Tree::new();
        let root = tree.insert(NodeData::element("count-view").with_attribute("count", "3"));
        let span = tree.insert_child(root, NodeData::element("span"));
        tree.insert_child(span, NodeData::text("a < b"));
        tree.insert_child(root, NodeData::element("input").with_attribute("disabled", ""));

        insta::assert_snapshot!(
            outer_markup(&tree, root),
            @r#"<count-view count="3"><span>a &lt; b</span><input disabled></count-view>"#
        );
        insta::assert_snapshot!(inner_markup(&tree, span), @"a &lt; b");
    }

    #[test]
    fn raw_text_is_not_escaped() {
        let mut tree = Tree::new();
        let root = tree.insert(NodeData::element("template"));
        tree.insert_child(root, NodeData::text("<b>{x}</b>"));
        assert_eq!(outer_markup(&tree, root), "<template><b>{x}</b></template>");
        assert_eq!(inner_markup(&tree, root), "<b>{x}</b>");
    }

    #[test]
    fn attribute_values_are_escaped() {
        let mut tree = Tree::new();
        let root = tree.insert(NodeData::element("p").with_attribute("title", r#"say "hi""#));
        assert_eq!(outer_markup(&tree, root), r#"<p title="say &quot;hi&quot;"></p>"#);
    }
}
