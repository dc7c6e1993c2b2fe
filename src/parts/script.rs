//! Named script handlers and the compile-once behavior that binds them.
//!
//! A behavior node's text content names a handler registered on the
//! document. Compiling resolves the name once, fixes the parameter list and
//! clears the text. Executing calls the handler with the governing
//! container as `this`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::component::ManagedElement;
use crate::container::ContainerElement;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::error::ScriptError;
use crate::event::Event;

/// A registered script body.
pub type ScriptHandler = Rc<dyn Fn(&ScriptCall<'_>) -> Result<(), ScriptError>>;

/// Name → handler table owned by the document.
#[derive(Default)]
pub struct ScriptRegistry {
    handlers: HashMap<String, ScriptHandler>,
}

impl ScriptRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` and keeps the existing handler if `name` is taken.
    pub fn register(&mut self, name: &str, handler: ScriptHandler) -> bool {
        if self.handlers.contains_key(name) {
            return false;
        }
        self.handlers.insert(name.to_owned(), handler);
        true
    }

    pub fn get(&self, name: &str) -> Option<ScriptHandler> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

/// The optional first argument of a script call.
#[derive(Debug, Clone)]
pub enum ScriptArg {
    /// An attribute value, absent when the attribute was removed.
    Value(Option<String>),
    Event(Event),
}

/// Everything a handler sees when it runs.
pub struct ScriptCall<'a> {
    pub doc: &'a Document,
    /// The governing container of the component, if it has one.
    pub this: Option<NodeId>,
    /// The component element the behavior is scoped to.
    pub component: NodeId,
    /// Declared parameter names: the optional argument name, then
    /// `component`.
    pub params: &'a [String],
    pub argument: Option<&'a ScriptArg>,
}

impl ScriptCall<'_> {
    pub fn value(&self) -> Option<&str> {
        match self.argument? {
            ScriptArg::Value(value) => value.as_deref(),
            ScriptArg::Event(_) => None,
        }
    }

    pub fn event(&self) -> Option<&Event> {
        match self.argument? {
            ScriptArg::Event(event) => Some(event),
            ScriptArg::Value(_) => None,
        }
    }

    pub fn element(&self) -> Option<Rc<ManagedElement>> {
        self.doc.element_as::<ManagedElement>(self.component)
    }

    pub fn container(&self) -> Option<Rc<ContainerElement>> {
        self.doc.element_as::<ContainerElement>(self.this?)
    }
}

struct Compiled {
    name: String,
    handler: ScriptHandler,
    params: Vec<String>,
}

/// A handler bound once and cached for the life of its element.
#[derive(Default)]
pub struct ScriptBehavior {
    compiled: RefCell<Option<Compiled>>,
}

impl ScriptBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the handler named by `node`'s text and clear the text.
    ///
    /// A second call is a no-op.
    pub fn compile(
        &self,
        doc: &Document,
        node: NodeId,
        argument: Option<&str>,
    ) -> Result<(), ScriptError> {
        if self.is_compiled() {
            return Ok(());
        }
        let name = doc.text_content(node).trim().to_owned();
        let handler = doc
            .script(&name)
            .ok_or_else(|| ScriptError::UnknownHandler(name.clone()))?;
        let params = argument
            .into_iter()
            .map(str::to_owned)
            .chain(std::iter::once("component".to_owned()))
            .collect();
        tracing::trace!(handler = %name, "script compiled");
        *self.compiled.borrow_mut() = Some(Compiled {
            name,
            handler,
            params,
        });
        doc.set_text_content(node, "");
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.compiled.borrow().is_some()
    }

    pub fn handler_name(&self) -> Option<String> {
        self.compiled.borrow().as_ref().map(|c| c.name.clone())
    }

    pub fn params(&self) -> Vec<String> {
        self.compiled
            .borrow()
            .as_ref()
            .map(|c| c.params.clone())
            .unwrap_or_default()
    }

    /// Run the handler for `component`. Handler errors are returned as is.
    pub fn execute(
        &self,
        doc: &Document,
        component: NodeId,
        argument: Option<ScriptArg>,
    ) -> Result<(), ScriptError> {
        let (handler, params) = match self.compiled.borrow().as_ref() {
            Some(compiled) => (Rc::clone(&compiled.handler), compiled.params.clone()),
            None => return Err(ScriptError::NotCompiled),
        };
        let this = doc
            .element_as::<ManagedElement>(component)
            .and_then(|element| element.container());
        handler(&ScriptCall {
            doc,
            this,
            component,
            params: &params,
            argument: argument.as_ref(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use pretty_assertions::assert_eq;

    use super::*;

    fn setup() -> (Document, NodeId, NodeId) {
        let doc = Document::new();
        let nodes = doc
            .append_markup(doc.body(), "<todo-item><script-part> double </script-part></todo-item>")
            .unwrap();
        let part = doc.children(nodes[0])[0];
        (doc, nodes[0], part)
    }

    #[test]
    fn compile_once_and_clear_text() {
        let (doc, _, part) = setup();
        let calls = Rc::new(Cell::new(0));
        {
            let calls = Rc::clone(&calls);
            doc.register_script("double", move |_| {
                calls.set(calls.get() + 1);
                Ok(())
            });
        }
        let script = ScriptBehavior::new();
        script.compile(&doc, part, Some("value")).unwrap();
        assert_eq!(doc.text_content(part), "");
        assert_eq!(script.handler_name().as_deref(), Some("double"));
        assert_eq!(script.params(), ["value", "component"]);

        // Text is gone, but the second compile never looks at it.
        script.compile(&doc, part, None).unwrap();
        assert_eq!(script.params(), ["value", "component"]);
    }

    #[test]
    fn unknown_handler() {
        let (doc, _, part) = setup();
        let script = ScriptBehavior::new();
        assert_eq!(
            script.compile(&doc, part, None),
            Err(ScriptError::UnknownHandler("double".into()))
        );
        assert!(!script.is_compiled());
        assert_eq!(doc.text_content(part), " double ");
    }

    #[test]
    fn execute_passes_arguments_and_propagates_errors() {
        let (doc, item, part) = setup();
        let seen = Rc::new(RefCell::new(Vec::new()));
        {
            let seen = Rc::clone(&seen);
            doc.register_script("double", move |call| {
                seen.borrow_mut().push((call.value().map(str::to_owned), call.params.to_vec(), call.this));
                match call.value() {
                    Some("bad") => Err(ScriptError::failed("double", "bad input")),
                    _ => Ok(()),
                }
            });
        }
        let script = ScriptBehavior::new();
        assert_eq!(script.execute(&doc, item, None), Err(ScriptError::NotCompiled));

        script.compile(&doc, part, Some("value")).unwrap();
        script
            .execute(&doc, item, Some(ScriptArg::Value(Some("2".into()))))
            .unwrap();
        let err = script
            .execute(&doc, item, Some(ScriptArg::Value(Some("bad".into()))))
            .unwrap_err();
        assert!(matches!(err, ScriptError::Failed { .. }));

        let seen = seen.borrow();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.as_deref(), Some("2"));
        assert_eq!(seen[0].1, ["value", "component"]);
        assert_eq!(seen[0].2, None);
    }

    #[test]
    fn registry_keeps_first() {
        let mut registry = ScriptRegistry::new();
        assert!(registry.register("a", Rc::new(|_: &ScriptCall<'_>| Ok(()))));
        assert!(!registry.register("a", Rc::new(|_: &ScriptCall<'_>| Err(ScriptError::NotCompiled))));
        assert_eq!(registry.len(), 1);
        assert!(registry.contains("a"));
    }
}
