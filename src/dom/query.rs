//! Selector queries: by id, class, tag, attribute; descendant combinators.
//!
//! The selector language is the small subset behavior parts need for their
//! `target` and `input` overrides: compound selectors (`tag#id.class[attr=v]`),
//! descendant (` `) and child (`>`) combinators, and comma-separated groups.

use std::str::FromStr;

use super::node::{NodeData, NodeId};
use super::tree::Tree;
use crate::error::SelectorError;

/// One `[name]` or `[name=value]` test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeTest {
    pub name: String,
    pub value: Option<String>,
}

/// A compound selector: every present part must match the same element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attributes: Vec<AttributeTest>,
}

impl Compound {
    /// Whether `data` satisfies this compound.
    pub fn matches(&self, data: &NodeData) -> bool {
        let Some(tag) = data.tag() else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|t| t != "*" && t != tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| data.id() != Some(id)) {
            return false;
        }
        if !self.classes.iter().all(|c| data.has_class(c)) {
            return false;
        }
        self.attributes.iter().all(|test| match &test.value {
            Some(value) => data.attribute(&test.name) == Some(value.as_str()),
            None => data.has_attribute(&test.name),
        })
    }
}

/// How a compound relates to the one before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
}

/// A chain of compounds joined by combinators, read left to right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex {
    pub head: Compound,
    pub tail: Vec<(Combinator, Compound)>,
}

/// A comma-separated selector group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    pub alternatives: Vec<Complex>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }
        let alternatives = trimmed
            .split(',')
            .map(|group| parse_complex(group.trim(), input))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives })
    }

    /// Whether `id` matches any alternative, considering ancestors up to (but
    /// excluding) `scope` for combinators.
    pub fn matches(&self, tree: &Tree, id: NodeId, scope: Option<NodeId>) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_complex(complex, tree, id, scope))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn parse_complex(group: &str, original: &str) -> Result<Complex, SelectorError> {
    let invalid = || SelectorError::Invalid(original.to_owned());
    if group.is_empty() {
        return Err(invalid());
    }
    // Normalise `a>b` and `a > b` into separate tokens.
    let spaced = group.replace('>', " > ");
    let mut tokens = spaced.split_whitespace().peekable();

    let head = parse_compound(tokens.next().ok_or_else(invalid)?).ok_or_else(invalid)?;
    let mut tail = Vec::new();
    while let Some(token) = tokens.next() {
        let (combinator, text) = if token == ">" {
            (Combinator::Child, tokens.next().ok_or_else(invalid)?)
        } else {
            (Combinator::Descendant, token)
        };
        tail.push((combinator, parse_compound(text).ok_or_else(invalid)?));
    }
    Ok(Complex { head, tail })
}

fn parse_compound(text: &str) -> Option<Compound> {
    fn is_name_char(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '-' || c == '_'
    }

    let mut compound = Compound::default();
    let mut rest = text;

    let tag_len = rest
        .char_indices()
        .find(|&(_, c)| !(is_name_char(c) || c == '*'))
        .map_or(rest.len(), |(i, _)| i);
    if tag_len > 0 {
        compound.tag = Some(rest[..tag_len].to_ascii_lowercase());
        rest = &rest[tag_len..];
    }

    while let Some(marker) = rest.chars().next() {
        rest = &rest[marker.len_utf8()..];
        match marker {
            '#' | '.' => {
                let len = rest
                    .char_indices()
                    .find(|&(_, c)| !is_name_char(c))
                    .map_or(rest.len(), |(i, _)| i);
                if len == 0 {
                    return None;
                }
                let name = rest[..len].to_owned();
                rest = &rest[len..];
                if marker == '#' {
                    compound.id = Some(name);
                } else {
                    compound.classes.push(name);
                }
            }
            '[' => {
                let close = rest.find(']')?;
                let body = &rest[..close];
                rest = &rest[close + 1..];
                let test = match body.split_once('=') {
                    Some((name, value)) => AttributeTest {
                        name: name.trim().to_owned(),
                        value: Some(value.trim().trim_matches(['"', '\'']).to_owned()),
                    },
                    None => AttributeTest {
                        name: body.trim().to_owned(),
                        value: None,
                    },
                };
                if test.name.is_empty() {
                    return None;
                }
                compound.attributes.push(test);
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn matches_complex(complex: &Complex, tree: &Tree, id: NodeId, scope: Option<NodeId>) -> bool {
    // Walk the chain right to left: the last compound must match `id` itself.
    let mut chain: Vec<(Option<Combinator>, &Compound)> = vec![(None, &complex.head)];
    chain.extend(complex.tail.iter().map(|(c, comp)| (Some(*c), comp)));

    let Some((last_combinator, last)) = chain.pop() else {
        return false;
    };
    if !tree.get(id).is_some_and(|data| last.matches(data)) {
        return false;
    }
    let ancestors: Vec<NodeId> = tree
        .ancestors(id)
        .into_iter()
        .take_while(|&a| Some(a) != scope)
        .collect();
    match_ancestors(&chain, last_combinator, tree, &ancestors)
}

fn match_ancestors(
    chain: &[(Option<Combinator>, &Compound)],
    combinator: Option<Combinator>,
    tree: &Tree,
    ancestors: &[NodeId],
) -> bool {
    let Some(((next_combinator, compound), rest)) = chain.split_last() else {
        return true;
    };
    let candidates = match combinator {
        Some(Combinator::Child) => &ancestors[..ancestors.len().min(1)],
        _ => ancestors,
    };
    candidates.iter().enumerate().any(|(i, &candidate)| {
        tree.get(candidate).is_some_and(|data| compound.matches(data))
            && match_ancestors(rest, *next_combinator, tree, &ancestors[i + 1..])
    })
}

impl Tree {
    /// First descendant of `scope` (excluding `scope`) matching `selector`, in tree order.
    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1)
            .find(|&id| selector.matches(self, id, Some(scope)))
    }

    /// All descendants of `scope` (excluding `scope`) matching `selector`, in tree order.
    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .skip(1)
            .filter(|&id| selector.matches(self, id, Some(scope)))
            .collect()
    }

    /// Find the first node whose `id` attribute matches, in arena order.
    pub fn query_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .find(|(_, data)| data.id() == Some(id))
            .map(|(node_id, _)| node_id)
    }

    /// All elements under `scope` (inclusive) with the given tag, in tree order.
    pub fn query_by_tag(&self, scope: NodeId, tag: &str) -> Vec<NodeId> {
        self.query_all(scope, |data| data.tag() == Some(tag))
    }

    /// All nodes under `scope` (inclusive) matching an arbitrary predicate, in tree order.
    pub fn query_all(&self, scope: NodeId, predicate: impl Fn(&NodeData) -> bool) -> Vec<NodeId> {
        self.walk_depth_first(scope)
            .into_iter()
            .filter(|&id| self.nodes.get(id).is_some_and(&predicate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// ```text
    ///       body
    ///      /    \
    ///   todo-card  div.content
    ///   #main       |
    ///   /   \      span[data-x=1]
    ///  ul   button.primary.btn
    ///  |
    /// li.item
    /// ```
    fn build() -> (Tree, [NodeId; 7]) {
        let mut tree = Tree::new();
        let body = tree.insert(NodeData::element("body"));
        let card = tree.insert_child(body, NodeData::element("todo-card").with_attribute("id", "main"));
        let ul = tree.insert_child(card, NodeData::element("ul"));
        let li = tree.insert_child(ul, NodeData::element("li").with_class("item"));
        let button = tree.insert_child(
            card,
            NodeData::element("button").with_class("primary").with_class("btn"),
        );
        let div = tree.insert_child(body, NodeData::element("div").with_class("content"));
        let span = tree.insert_child(div, NodeData::element("span").with_attribute("data-x", "1"));
        (tree, [body, card, ul, li, button, div, span])
    }

    #[test]
    fn parse_compound_parts() {
        let sel = Selector::parse("input#name.big.wide[type=text][required]").unwrap();
        let head = &sel.alternatives[0].head;
        assert_eq!(head.tag.as_deref(), Some("input"));
        assert_eq!(head.id.as_deref(), Some("name"));
        assert_eq!(head.classes, vec!["big", "wide"]);
        assert_eq!(head.attributes.len(), 2);
        assert_eq!(head.attributes[0].value.as_deref(), Some("text"));
        assert_eq!(head.attributes[1].value, None);
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(Selector::parse("a,"), Err(SelectorError::Invalid(_))));
        assert!(matches!(Selector::parse("div >"), Err(SelectorError::Invalid(_))));
        assert!(matches!(Selector::parse("[=x]"), Err(SelectorError::Invalid(_))));
        assert!(matches!(Selector::parse("a!b"), Err(SelectorError::Invalid(_))));
    }

    #[test]
    fn query_by_tag_and_class() {
        let (tree, [body, _, _, li, button, ..]) = build();
        let sel: Selector = "li.item".parse().unwrap();
        assert_eq!(tree.query_selector(body, &sel), Some(li));
        let sel: Selector = ".btn".parse().unwrap();
        assert_eq!(tree.query_selector_all(body, &sel), vec![button]);
    }

    #[test]
    fn query_excludes_scope() {
        let (tree, [_, card, ..]) = build();
        let sel: Selector = "todo-card".parse().unwrap();
        assert_eq!(tree.query_selector(card, &sel), None);
    }

    #[test]
    fn descendant_and_child_combinators() {
        let (tree, [body, card, _, li, ..]) = build();
        let sel: Selector = "#main li".parse().unwrap();
        assert_eq!(tree.query_selector(body, &sel), Some(li));
        let sel: Selector = "#main > li".parse().unwrap();
        assert_eq!(tree.query_selector(body, &sel), None);
        let sel: Selector = "todo-card>ul>li".parse().unwrap();
        assert_eq!(tree.query_selector(body, &sel), Some(li));
        // Ancestors at or above the scope do not participate.
        let sel: Selector = "todo-card li".parse().unwrap();
        assert_eq!(tree.query_selector(card, &sel), None);
    }

    #[test]
    fn attribute_and_group() {
        let (tree, [body, _, ul, _, _, _, span]) = build();
        let sel: Selector = "[data-x=1], ul".parse().unwrap();
        assert_eq!(tree.query_selector_all(body, &sel), vec![ul, span]);
        let sel: Selector = "span[data-x=\"2\"]".parse().unwrap();
        assert_eq!(tree.query_selector(body, &sel), None);
    }

    #[test]
    fn legacy_queries() {
        let (tree, [body, card, _, li, ..]) = build();
        assert_eq!(tree.query_by_id("main"), Some(card));
        assert_eq!(tree.query_by_id("missing"), None);
        assert_eq!(tree.query_by_tag(body, "li"), vec![li]);
        assert_eq!(tree.query_all(body, NodeData::is_custom), vec![card]);
    }
}
