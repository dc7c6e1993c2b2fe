//! The property proxy sitting between a component and its state.
//!
//! Writes through [`ObservedProperties::set`] are filtered (unknown names and
//! no-op writes are rejected), applied, and then announced to subscribers.
//! Subscribers run after the internal borrow is released, so they may read
//! or write the properties again.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use super::value::Value;

/// Called with `(name, old, new)` after an accepted write.
pub type PropertyListener = Rc<dyn Fn(&str, &Value, &Value)>;

/// Ordered observable properties of one component, plus change listeners.
pub struct ObservedProperties {
    values: RefCell<Vec<(String, Value)>>,
    listeners: RefCell<Vec<PropertyListener>>,
}

impl ObservedProperties {
    /// All names start out [`Value::Null`].
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            values: RefCell::new(
                names
                    .into_iter()
                    .map(|n| (n.as_ref().to_owned(), Value::Null))
                    .collect(),
            ),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.values
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }

    /// String form of a property; empty for unknown names and nulls.
    pub fn text(&self, name: &str) -> String {
        self.get(name).map(|v| v.to_attribute()).unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.borrow().iter().any(|(n, _)| n == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.values.borrow().iter().map(|(n, _)| n.clone()).collect()
    }

    pub fn snapshot(&self) -> Vec<(String, Value)> {
        self.values.borrow().clone()
    }

    /// Write through the proxy. Returns `true` if the value changed and
    /// listeners were notified.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> bool {
        let value = value.into();
        let Some(old) = self.replace(name, value.clone()) else {
            return false;
        };
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(name, &old, &value);
        }
        true
    }

    /// Write the backing value without notifying anyone.
    pub fn set_quiet(&self, name: &str, value: impl Into<Value>) -> bool {
        self.replace(name, value.into()).is_some()
    }

    /// Swap in `value`, returning the old one when the write is accepted.
    fn replace(&self, name: &str, value: Value) -> Option<Value> {
        let mut values = self.values.borrow_mut();
        let Some((_, slot)) = values.iter_mut().find(|(n, _)| n == name) else {
            tracing::warn!(property = %name, "write to unknown property ignored");
            return None;
        };
        if *slot == value {
            return None;
        }
        Some(std::mem::replace(slot, value))
    }

    pub fn subscribe(&self, listener: impl Fn(&str, &Value, &Value) + 'static) {
        self.listeners.borrow_mut().push(Rc::new(listener));
    }
}

impl fmt::Debug for ObservedProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.borrow().iter().map(|(n, v)| (n.clone(), v.clone())))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn starts_null_in_declared_order() {
        let props = ObservedProperties::new(&["count", "label"]);
        assert_eq!(props.names(), ["count", "label"]);
        assert_eq!(props.get("count"), Some(Value::Null));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn no_op_and_unknown_writes_are_rejected() {
        let props = ObservedProperties::new(&["count"]);
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            props.subscribe(move |_, _, _| hits.set(hits.get() + 1));
        }
        assert!(props.set("count", 1));
        assert!(!props.set("count", 1));
        assert!(!props.set("other", 1));
        assert!(props.set("count", "1"));
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn quiet_writes_skip_listeners() {
        let props = ObservedProperties::new(&["count"]);
        let hits = Rc::new(Cell::new(0));
        {
            let hits = Rc::clone(&hits);
            props.subscribe(move |_, _, _| hits.set(hits.get() + 1));
        }
        assert!(props.set_quiet("count", "5"));
        assert_eq!(props.text("count"), "5");
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn listeners_may_write_again() {
        let props = Rc::new(ObservedProperties::new(&["count", "double"]));
        {
            let weak = Rc::downgrade(&props);
            props.subscribe(move |name, _, new| {
                if name == "count" {
                    if let (Some(props), Some(n)) = (weak.upgrade(), new.as_number()) {
                        props.set("double", n * 2.0);
                    }
                }
            });
        }
        props.set("count", 4);
        assert_eq!(props.get("double"), Some(Value::Number(8.0)));
    }
}
