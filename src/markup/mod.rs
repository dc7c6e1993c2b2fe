//! Declarative markup: tokenizer, parser and serializer.

pub mod parser;
pub mod serialize;
pub mod tokenizer;

pub use parser::{parse_markup, MarkupNode};
pub use serialize::{inner_markup, outer_markup};
