//! logos-based markup tokenizer.
//!
//! Markup lexing is modal: outside a tag everything up to the next `<` is
//! text, inside a tag whitespace separates names and values. The two modes
//! are two token enums sharing one source, switched with [`logos::Lexer::morph`].

use logos::{Lexer, Logos};

/// Tokens produced between tags.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentToken {
    /// `<!-- ... -->`, consumed whole by a callback.
    #[token("<!--", skip_comment)]
    Comment,

    /// `</name>` including optional whitespace before `>`.
    #[regex(r"</[a-zA-Z][a-zA-Z0-9_-]*[ \t\n\r]*>")]
    CloseTag,

    /// `<name`; attributes follow in [`TagToken`] mode.
    #[regex(r"<[a-zA-Z][a-zA-Z0-9_-]*")]
    OpenTagStart,

    /// Any run of text up to the next `<`.
    #[regex(r"[^<]+")]
    Text,
}

/// Tokens produced inside an open tag.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum TagToken {
    /// `/>`
    #[token("/>")]
    SelfClose,

    /// `>`
    #[token(">")]
    Close,

    /// `=`
    #[token("=")]
    Equals,

    /// `"..."`
    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    /// `'...'`
    #[regex(r"'[^']*'")]
    SingleQuoted,

    /// Attribute name or unquoted attribute value.
    #[regex(r#"[^ \t\n\r\f"'=<>/]+"#)]
    Word,
}

fn skip_comment(lex: &mut Lexer<'_, ContentToken>) -> bool {
    match lex.remainder().find("-->") {
        Some(end) => {
            lex.bump(end + 3);
            true
        }
        None => false,
    }
}

/// Replace the handful of character references markup authors actually use.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_owned();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

/// Escape text content for serialization.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value for serialization inside double quotes.
pub fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}
