//! Markup parser.
//!
//! Turns declarative markup into a [`MarkupNode`] forest. Uses the modal
//! tokenizer from [`crate::markup::tokenizer`]: content tokens between tags,
//! tag tokens inside them.
//!
//! Whitespace-only text between tags is dropped. `<template>` and `<script>`
//! bodies are captured verbatim as a single text child. Void elements
//! (`input`, `br`, ...) never take children.

use logos::{Lexer, Logos};

use super::tokenizer::{decode_entities, ContentToken, TagToken};
use crate::error::MarkupError;

/// Elements that never have content or a closing tag.
const VOID_ELEMENTS: &[&str] = &["area", "br", "col", "hr", "img", "input", "link", "meta"];

/// Elements whose body is captured as raw text.
const RAW_TEXT_ELEMENTS: &[&str] = &["template", "script", "style"];

/// One parsed node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<MarkupNode>,
    },
    Text(String),
}

impl MarkupNode {
    /// Tag for elements.
    pub fn tag(&self) -> Option<&str> {
        match self {
            Self::Element { tag, .. } => Some(tag),
            Self::Text(_) => None,
        }
    }
}

/// Whether `tag` is a void element.
pub fn is_void(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// Whether `tag` captures its body as raw text.
pub fn is_raw_text(tag: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&tag)
}

/// An element whose closing tag has not been seen yet.
struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<MarkupNode>,
}

/// Parse a markup string into a forest of nodes.
pub fn parse_markup(input: &str) -> Result<Vec<MarkupNode>, MarkupError> {
    let mut roots = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();
    let mut lex = ContentToken::lexer(input);

    while let Some(result) = lex.next() {
        let span = lex.span();
        let token = result.map_err(|()| MarkupError::UnexpectedToken {
            position: span.start,
            message: format!("unexpected `{}`", lex.slice()),
        })?;

        match token {
            ContentToken::Comment => {}
            ContentToken::Text => {
                let text = lex.slice();
                if !text.trim().is_empty() {
                    push_node(&mut stack, &mut roots, MarkupNode::Text(decode_entities(text)));
                }
            }
            ContentToken::CloseTag => {
                let name = lex.slice()[2..]
                    .trim_end_matches('>')
                    .trim()
                    .to_ascii_lowercase();
                let Some(open) = stack.pop() else {
                    return Err(MarkupError::UnexpectedToken {
                        position: span.start,
                        message: format!("closing tag `</{name}>` without an open element"),
                    });
                };
                if open.tag != name {
                    return Err(MarkupError::MismatchedClose {
                        expected: open.tag,
                        found: name,
                    });
                }
                let node = MarkupNode::Element {
                    tag: open.tag,
                    attributes: open.attributes,
                    children: open.children,
                };
                push_node(&mut stack, &mut roots, node);
            }
            ContentToken::OpenTagStart => {
                let tag = lex.slice()[1..].to_ascii_lowercase();
                let mut tag_lex: Lexer<'_, TagToken> = lex.morph();
                let (attributes, self_closing) = parse_attributes(&mut tag_lex, &tag)?;
                lex = tag_lex.morph();

                if self_closing || is_void(&tag) {
                    let node = MarkupNode::Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                    };
                    push_node(&mut stack, &mut roots, node);
                    continue;
                }

                let mut children = Vec::new();
                if is_raw_text(&tag) {
                    let closing = format!("</{tag}");
                    let end = lex
                        .remainder()
                        .find(&closing)
                        .ok_or_else(|| MarkupError::UnexpectedEof(format!("unclosed <{tag}>")))?;
                    let raw = &lex.remainder()[..end];
                    if !raw.trim().is_empty() {
                        children.push(MarkupNode::Text(raw.to_owned()));
                    }
                    lex.bump(end);
                }
                stack.push(OpenElement {
                    tag,
                    attributes,
                    children,
                });
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(MarkupError::UnexpectedEof(format!("unclosed <{}>", open.tag)));
    }
    Ok(roots)
}

fn push_node(stack: &mut [OpenElement], roots: &mut Vec<MarkupNode>, node: MarkupNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

/// Parse `name`, `name=value`, `name="value"` pairs up to `>` or `/>`.
///
/// Returns the attributes and whether the tag was self-closing.
fn parse_attributes(
    lex: &mut Lexer<'_, TagToken>,
    tag: &str,
) -> Result<(Vec<(String, String)>, bool), MarkupError> {
    let mut attributes: Vec<(String, String)> = Vec::new();
    let mut pending: Option<String> = None;
    let mut expect_value = false;

    while let Some(result) = lex.next() {
        let position = lex.span().start;
        let unexpected = |message: String| MarkupError::UnexpectedToken { position, message };
        let token = result.map_err(|()| unexpected(format!("unexpected `{}` in <{tag}>", lex.slice())))?;

        match token {
            TagToken::Word if expect_value => {
                let name = pending.take().unwrap_or_default();
                set(&mut attributes, name, decode_entities(lex.slice()));
                expect_value = false;
            }
            TagToken::Word => {
                if let Some(name) = pending.take() {
                    set(&mut attributes, name, String::new());
                }
                pending = Some(lex.slice().to_ascii_lowercase());
            }
            TagToken::Equals => {
                if pending.is_none() || expect_value {
                    return Err(unexpected(format!("stray `=` in <{tag}>")));
                }
                expect_value = true;
            }
            TagToken::DoubleQuoted | TagToken::SingleQuoted => {
                if !expect_value {
                    return Err(unexpected(format!("unexpected quoted value in <{tag}>")));
                }
                let quoted = lex.slice();
                let name = pending.take().unwrap_or_default();
                set(&mut attributes, name, decode_entities(&quoted[1..quoted.len() - 1]));
                expect_value = false;
            }
            TagToken::Close | TagToken::SelfClose => {
                if expect_value {
                    return Err(unexpected(format!("missing attribute value in <{tag}>")));
                }
                if let Some(name) = pending.take() {
                    set(&mut attributes, name, String::new());
                }
                return Ok((attributes, token == TagToken::SelfClose));
            }
        }
    }
    Err(MarkupError::UnexpectedEof(format!("unterminated <{tag}")))
}

/// First occurrence of an attribute wins.
fn set(attributes: &mut Vec<(String, String)>, name: String, value: String) {
    if !attributes.iter().any(|(n, _)| *n == name) {
        attributes.push((name, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<MarkupNode>) -> MarkupNode {
        MarkupNode::Element {
            tag: tag.to_owned(),
            attributes: attributes
                .iter()
                .map(|(n, v)| ((*n).to_owned(), (*v).to_owned()))
                .collect(),
            children,
        }
    }

    fn text(t: &str) -> MarkupNode {
        MarkupNode::Text(t.to_owned())
    }

    #[test]
    fn nested_elements_and_text() {
        let nodes = parse_markup(r#"<count-view count="3"><span class=big>n = 3</span></count-view>"#).unwrap();
        assert_eq!(
            nodes,
            vec![element(
                "count-view",
                &[("count", "3")],
                vec![element("span", &[("class", "big")], vec![text("n = 3")])],
            )]
        );
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let nodes = parse_markup("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
        assert_eq!(
            nodes,
            vec![element(
                "ul",
                &[],
                vec![
                    element("li", &[], vec![text("a")]),
                    element("li", &[], vec![text("b")]),
                ],
            )]
        );
    }

    #[test]
    fn void_and_self_closing() {
        let nodes = parse_markup(r#"<p><input type="text" disabled><br/>x</p>"#).unwrap();
        assert_eq!(
            nodes,
            vec![element(
                "p",
                &[],
                vec![
                    element("input", &[("type", "text"), ("disabled", "")], vec![]),
                    element("br", &[], vec![]),
                    text("x"),
                ],
            )]
        );
    }

    #[test]
    fn raw_text_template() {
        let nodes = parse_markup("<todo-card><template><b>{x}</b></template></todo-card>").unwrap();
        assert_eq!(
            nodes,
            vec![element(
                "todo-card",
                &[],
                vec![element("template", &[], vec![text("<b>{x}</b>")])],
            )]
        );
    }

    #[test]
    fn entities_and_comments() {
        let nodes = parse_markup(r#"<p title="a &amp; b">1 &lt; 2<!-- hidden --></p>"#).unwrap();
        assert_eq!(
            nodes,
            vec![element("p", &[("title", "a & b")], vec![text("1 < 2")])]
        );
    }

    #[test]
    fn duplicate_attribute_keeps_first() {
        let nodes = parse_markup(r#"<a x="1" x="2"></a>"#).unwrap();
        assert_eq!(nodes, vec![element("a", &[("x", "1")], vec![])]);
    }

    #[test]
    fn multiple_roots() {
        let nodes = parse_markup("<a></a>text<b></b>").unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[1], text("text"));
    }

    #[test]
    fn errors() {
        assert!(matches!(
            parse_markup("<a><b></a>"),
            Err(MarkupError::MismatchedClose { .. })
        ));
        assert!(matches!(parse_markup("<a>"), Err(MarkupError::UnexpectedEof(_))));
        assert!(matches!(parse_markup("<a x="), Err(MarkupError::UnexpectedEof(_))));
        assert!(matches!(parse_markup("</a>"), Err(MarkupError::UnexpectedToken { .. })));
        assert!(matches!(parse_markup("<a =x>"), Err(MarkupError::UnexpectedToken { .. })));
        assert!(matches!(parse_markup("< a>"), Err(MarkupError::UnexpectedToken { .. })));
    }
}
