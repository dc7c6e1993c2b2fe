//! Behavior parts: declarative modifiers nested inside a managed element.
//!
//! Every part scopes itself to its nearest hyphen-tagged ancestor at
//! attachment. A part without one stays inert.

pub mod on_event;
pub mod property_input;
pub mod property_observer;
pub mod script;
pub mod script_part;

use std::rc::Rc;

use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::{CustomElement, ElementDefinition};
use crate::dom::traverse::{nearest_custom_ancestor, NodeRef};

pub use on_event::OnEvent;
pub use property_input::PropertyInput;
pub use property_observer::PropertyObserver;
pub use script::{ScriptArg, ScriptBehavior, ScriptCall, ScriptHandler, ScriptRegistry};
pub use script_part::ScriptPart;

pub const PROPERTY_INPUT: &str = "property-input";
pub const PROPERTY_OBSERVER: &str = "property-observer";
pub const ON_EVENT: &str = "on-event";
pub const SCRIPT_PART: &str = "script-part";

/// The element a part at `node` is scoped to.
pub fn governing_element(doc: &Document, node: NodeId) -> Option<NodeId> {
    let found = {
        let tree = doc.tree();
        nearest_custom_ancestor(&NodeRef::new(&tree, node), &doc.config().root_tag).map(|n| n.id)
    };
    if found.is_none() {
        tracing::debug!(?node, tag = ?doc.tag(node), "part has no governing element");
    }
    found
}

type Construct = fn(&Document, NodeId) -> Rc<dyn CustomElement>;

/// Element definition for one built-in part tag.
pub struct PartDefinition {
    tag: &'static str,
    construct: Construct,
}

impl ElementDefinition for PartDefinition {
    fn tag(&self) -> &str {
        self.tag
    }

    fn observed_attributes(&self) -> &[String] {
        &[]
    }

    fn construct(&self, doc: &Document, node: NodeId) -> Rc<dyn CustomElement> {
        (self.construct)(doc, node)
    }
}

/// Definitions for every built-in part.
pub fn definitions() -> Vec<Rc<dyn ElementDefinition>> {
    let parts: [(&'static str, Construct); 4] = [
        (PROPERTY_INPUT, |_, _| PropertyInput::new() as Rc<dyn CustomElement>),
        (PROPERTY_OBSERVER, |_, _| PropertyObserver::new() as Rc<dyn CustomElement>),
        (ON_EVENT, |_, _| OnEvent::new() as Rc<dyn CustomElement>),
        (SCRIPT_PART, |_, _| ScriptPart::new() as Rc<dyn CustomElement>),
    ];
    parts
        .into_iter()
        .map(|(tag, construct)| Rc::new(PartDefinition { tag, construct }) as Rc<dyn ElementDefinition>)
        .collect()
}
