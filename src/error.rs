//! Error taxonomy.
//!
//! Configuration errors are fatal and surface at definition time. Markup and
//! selector errors come from parsing. Script errors come from compiling or
//! running behavior handlers and are reported through the document's error
//! sink. Resolution misses are not errors at all.

use thiserror::Error;

/// A component or container class is unusable as declared.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("class has no tag")]
    MissingTag,
    #[error("class `{tag}` has no observable property list")]
    MissingObservables { tag: String },
    #[error("tag `{tag}` is not a valid custom tag: it must be lowercase and contain a hyphen")]
    InvalidTag { tag: String },
    #[error("class `{tag}` declares an invalid observable property name `{name}`")]
    InvalidProperty { tag: String, name: String },
    #[error("class `{tag}` declares observable property `{name}` more than once")]
    DuplicateProperty { tag: String, name: String },
    #[error("class `{tag}` has no factory")]
    MissingFactory { tag: String },
}

/// Malformed declarative markup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unexpected token at byte {position}: {message}")]
    UnexpectedToken { position: usize, message: String },
    #[error("unexpected end of input: {0}")]
    UnexpectedEof(String),
    #[error("closing tag `</{found}>` does not match open tag `<{expected}>`")]
    MismatchedClose { expected: String, found: String },
}

/// Malformed selector string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("invalid selector `{0}`")]
    Invalid(String),
}

/// Failure compiling or running a behavior script.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptError {
    #[error("no script handler registered under `{0}`")]
    UnknownHandler(String),
    #[error("script has not been compiled")]
    NotCompiled,
    #[error("script has no governing element")]
    NoScope,
    #[error("script `{handler}` failed: {message}")]
    Failed { handler: String, message: String },
}

impl ScriptError {
    /// Convenience constructor for handler bodies.
    pub fn failed(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// Misuse of a change observer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ObserveError {
    #[error("observer options are frozen once watching has started")]
    AlreadyWatching,
}

/// Umbrella error for host-level operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Markup(#[from] MarkupError),
    #[error(transparent)]
    Selector(#[from] SelectorError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Observe(#[from] ObserveError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_messages() {
        let err = ConfigError::InvalidTag { tag: "counter".into() };
        assert!(err.to_string().contains("`counter`"));
        assert_eq!(ConfigError::MissingTag.to_string(), "class has no tag");
    }

    #[test]
    fn umbrella_from_conversions() {
        let err: Error = ScriptError::UnknownHandler("save".into()).into();
        assert!(matches!(err, Error::Script(ScriptError::UnknownHandler(_))));
        assert_eq!(err.to_string(), "no script handler registered under `save`");

        let err: Error = MarkupError::UnexpectedEof("tag".into()).into();
        assert!(matches!(err, Error::Markup(_)));
    }

    #[test]
    fn script_failed_helper() {
        let err = ScriptError::failed("onCount", "boom");
        assert_eq!(err.to_string(), "script `onCount` failed: boom");
    }
}
