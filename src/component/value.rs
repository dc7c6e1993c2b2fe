//! Typed property values and their attribute string form.

use std::fmt;

/// The typed form of an observable property.
///
/// Attributes only carry strings, so every value has a string form
/// ([`Value::to_attribute`]); reading an attribute back always yields
/// [`Value::Text`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    Text(String),
    Number(f64),
    Bool(bool),
    #[default]
    Null,
}

impl Value {
    /// String form written to the host attribute.
    pub fn to_attribute(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
        }
    }

    pub fn from_attribute(value: &str) -> Self {
        Value::Text(value.to_owned())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Numeric view. Text is parsed after trimming.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(text) => text.trim().parse().ok(),
            Value::Bool(_) | Value::Null => None,
        }
    }

    /// Truthiness: non-empty text other than `"false"`, non-zero numbers.
    pub fn as_bool(&self) -> bool {
        match self {
            Value::Text(text) => !text.is_empty() && text != "false",
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Bool(b) => *b,
            Value::Null => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_attribute())
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_forms() {
        assert_eq!(Value::from(1).to_attribute(), "1");
        assert_eq!(Value::from(1.5).to_attribute(), "1.5");
        assert_eq!(Value::from(true).to_attribute(), "true");
        assert_eq!(Value::from("a b").to_attribute(), "a b");
        assert_eq!(Value::Null.to_attribute(), "");
        assert_eq!(Value::from(None::<i32>), Value::Null);
    }

    #[test]
    fn typed_and_text_differ_but_share_string_form() {
        let typed = Value::from(3);
        let text = Value::from_attribute("3");
        assert_ne!(typed, text);
        assert_eq!(typed.to_attribute(), text.to_attribute());
        assert_eq!(text.as_number(), Some(3.0));
    }

    #[test]
    fn truthiness() {
        assert!(Value::from("yes").as_bool());
        assert!(!Value::from("false").as_bool());
        assert!(!Value::from(0).as_bool());
        assert!(!Value::Null.as_bool());
    }
}
