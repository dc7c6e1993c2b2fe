//! Node types: NodeId, NodeData.

use slotmap::new_key_type;

new_key_type! {
    /// Unique identifier for a node in a document. Copy, lightweight (u64).
    pub struct NodeId;
}

/// Whether `tag` names a custom element. Host custom tags always contain a hyphen.
pub fn is_custom_tag(tag: &str) -> bool {
    tag.contains('-')
}

/// A single `name="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

/// Element or text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// A tagged element with ordered attributes.
    Element {
        tag: String,
        attributes: Vec<Attribute>,
    },
    /// A text node.
    Text(String),
}

/// Data associated with a single node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
}

impl NodeData {
    /// Create an element node. Tag names are stored lowercase.
    pub fn element(tag: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.into().to_ascii_lowercase(),
                attributes: Vec::new(),
            },
        }
    }

    /// Create a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Text(text.into()),
        }
    }

    /// Set an attribute (builder).
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(&name.into(), value.into());
        self
    }

    /// Add a CSS class (builder).
    pub fn with_class(mut self, class: &str) -> Self {
        if !self.has_class(class) {
            let classes = match self.attribute("class") {
                Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
                _ => class.to_owned(),
            };
            self.set_attribute("class", classes);
        }
        self
    }

    /// Tag name for elements, `None` for text.
    pub fn tag(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text(_))
    }

    /// Whether this is an element with a hyphenated tag.
    pub fn is_custom(&self) -> bool {
        self.tag().is_some_and(is_custom_tag)
    }

    /// Text payload for text nodes.
    pub fn text_data(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Replace the payload of a text node. Returns the previous text, or
    /// `None` if this is not a text node.
    pub fn set_text_data(&mut self, text: String) -> Option<String> {
        match &mut self.kind {
            NodeKind::Text(existing) => Some(std::mem::replace(existing, text)),
            NodeKind::Element { .. } => None,
        }
    }

    /// All attributes in insertion order. Empty for text nodes.
    pub fn attributes(&self) -> &[Attribute] {
        match &self.kind {
            NodeKind::Element { attributes, .. } => attributes,
            NodeKind::Text(_) => &[],
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Set an attribute, returning the previous value. No-op on text nodes.
    pub fn set_attribute(&mut self, name: &str, value: String) -> Option<String> {
        let NodeKind::Element { attributes, .. } = &mut self.kind else {
            return None;
        };
        match attributes.iter_mut().find(|attr| attr.name == name) {
            Some(attr) => Some(std::mem::replace(&mut attr.value, value)),
            None => {
                attributes.push(Attribute {
                    name: name.to_owned(),
                    value,
                });
                None
            }
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let NodeKind::Element { attributes, .. } = &mut self.kind else {
            return None;
        };
        let index = attributes.iter().position(|attr| attr.name == name)?;
        Some(attributes.remove(index).value)
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    /// Check whether the `class` attribute lists `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attribute("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }
}
