//! `script-part`: a script compiled on attachment and run on demand.

use std::cell::Cell;
use std::rc::Rc;

use super::governing_element;
use super::script::{ScriptArg, ScriptBehavior};
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::CustomElement;
use crate::error::ScriptError;

#[derive(Default)]
pub struct ScriptPart {
    script: ScriptBehavior,
    target: Cell<Option<NodeId>>,
}

impl ScriptPart {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// The element this part is scoped to while attached.
    pub fn target(&self) -> Option<NodeId> {
        self.target.get()
    }

    pub fn script(&self) -> &ScriptBehavior {
        &self.script
    }

    /// Run the compiled script against the governing element.
    pub fn execute(&self, doc: &Document, argument: Option<ScriptArg>) -> Result<(), ScriptError> {
        let target = self.target.get().ok_or(ScriptError::NoScope)?;
        self.script.execute(doc, target, argument)
    }
}

impl CustomElement for ScriptPart {
    fn connected(&self, doc: &Document, node: NodeId) {
        let Some(target) = governing_element(doc, node) else {
            return;
        };
        let argument = doc.attribute(node, "argument");
        if let Err(err) = self.script.compile(doc, node, argument.as_deref()) {
            doc.report_error(err);
            return;
        }
        self.target.set(Some(target));
    }

    fn disconnected(&self, _doc: &Document, _node: NodeId, _former_path: &[NodeId]) {
        self.target.set(None);
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn into_any(self: Rc<Self>) -> Rc<dyn std::any::Any> {
        self
    }
}
