//! Custom element definitions and the tag → definition registry.
//!
//! A definition constructs one [`CustomElement`] per upgraded node. The
//! document calls the element's callbacks as the node is connected,
//! disconnected, or has one of its observed attributes changed.

use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use super::document::Document;
use super::node::NodeId;

/// Behavior attached to one upgraded node.
///
/// Callbacks receive the document and may mutate it freely: the document
/// never holds a borrow while calling them.
pub trait CustomElement: 'static {
    /// The node became connected to the document root.
    fn connected(&self, _doc: &Document, _node: NodeId) {}

    /// The node was disconnected. `former_path` lists the node's ancestors
    /// at the moment of removal, nearest first.
    fn disconnected(&self, _doc: &Document, _node: NodeId, _former_path: &[NodeId]) {}

    /// An observed attribute was set or removed.
    fn attribute_changed(
        &self,
        _doc: &Document,
        _node: NodeId,
        _name: &str,
        _old: Option<&str>,
        _new: Option<&str>,
    ) {
    }

    fn as_any(&self) -> &dyn Any;

    fn into_any(self: Rc<Self>) -> Rc<dyn Any>;
}

/// A named element type.
pub trait ElementDefinition: 'static {
    fn tag(&self) -> &str;

    /// Attribute names whose changes reach [`CustomElement::attribute_changed`].
    fn observed_attributes(&self) -> &[String];

    /// Build the element for a freshly upgraded node.
    fn construct(&self, doc: &Document, node: NodeId) -> Rc<dyn CustomElement>;
}

/// Tag → definition map. Append-only.
#[derive(Default)]
pub struct ElementRegistry {
    definitions: HashMap<String, Rc<dyn ElementDefinition>>,
    order: Vec<String>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `definition` under its tag.
    ///
    /// Returns `false` and keeps the existing definition if the tag is taken.
    pub fn define(&mut self, definition: Rc<dyn ElementDefinition>) -> bool {
        let tag = definition.tag().to_owned();
        if self.definitions.contains_key(&tag) {
            return false;
        }
        self.order.push(tag.clone());
        self.definitions.insert(tag, definition);
        true
    }

    pub fn get(&self, tag: &str) -> Option<Rc<dyn ElementDefinition>> {
        self.definitions.get(tag).cloned()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.definitions.contains_key(tag)
    }

    /// Defined tags in definition order.
    pub fn tags(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inert;

    impl CustomElement for Inert {
        fn as_any(&self) -> &dyn Any {
            self
        }
        fn into_any(self: Rc<Self>) -> Rc<dyn Any> {
            self
        }
    }

    struct Def(&'static str, Vec<String>);

    impl ElementDefinition for Def {
        fn tag(&self) -> &str {
            self.0
        }
        fn observed_attributes(&self) -> &[String] {
            &self.1
        }
        fn construct(&self, _doc: &Document, _node: NodeId) -> Rc<dyn CustomElement> {
            Rc::new(Inert)
        }
    }

    #[test]
    fn define_and_get() {
        let mut registry = ElementRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.define(Rc::new(Def("count-view", vec!["count".into()]))));
        assert!(registry.contains("count-view"));
        let def = registry.get("count-view").unwrap();
        assert_eq!(def.observed_attributes(), ["count".to_owned()]);
        assert!(registry.get("todo-card").is_none());
    }

    #[test]
    fn duplicate_define_keeps_first() {
        let mut registry = ElementRegistry::new();
        assert!(registry.define(Rc::new(Def("count-view", vec!["count".into()]))));
        assert!(!registry.define(Rc::new(Def("count-view", Vec::new()))));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("count-view").unwrap().observed_attributes().len(), 1);
    }

    #[test]
    fn tags_in_definition_order() {
        let mut registry = ElementRegistry::new();
        registry.define(Rc::new(Def("b-el", Vec::new())));
        registry.define(Rc::new(Def("a-el", Vec::new())));
        assert_eq!(registry.tags(), ["b-el".to_owned(), "a-el".to_owned()]);
    }
}
