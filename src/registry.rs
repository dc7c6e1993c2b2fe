//! Composition root: define component classes, containers and the built-in
//! parts on a document.
//!
//! ```ignore
//! let doc = Document::new();
//! registry::register_parts(&doc);
//! registry::define_container::<TodoCard>(&doc)?;
//! registry::define_component::<CountView>(&doc)?;
//! doc.append_markup(doc.body(), r#"<todo-card></todo-card>"#)?;
//! ```

use std::rc::Rc;

use crate::component::{ComponentClass, ComponentType};
use crate::container::{ContainerClass, ContainerType};
use crate::dom::document::Document;
use crate::error::ConfigError;
use crate::parts;

/// Define `C` on `doc`.
///
/// Returns `Ok(false)` when the tag was already defined; the existing
/// definition is kept.
pub fn define_component<C: ComponentType>(doc: &Document) -> Result<bool, ConfigError> {
    let class = ComponentClass::of::<C>()?;
    Ok(define_component_class(doc, class))
}

/// Define a class built with [`ComponentClass::builder`].
pub fn define_component_class(doc: &Document, class: ComponentClass) -> bool {
    let tag = class.tag().to_owned();
    let defined = doc.define(Rc::new(class));
    if !defined {
        tracing::debug!(tag = %tag, "component already defined");
    }
    defined
}

/// Define the container `K` on `doc`.
pub fn define_container<K: ContainerType>(doc: &Document) -> Result<bool, ConfigError> {
    let class = ContainerClass::of::<K>()?;
    let tag = class.tag().to_owned();
    let defined = doc.define(Rc::new(class));
    if !defined {
        tracing::debug!(tag = %tag, "container already defined");
    }
    Ok(defined)
}

/// Define every built-in part. Returns how many were newly defined.
pub fn register_parts(doc: &Document) -> usize {
    parts::definitions()
        .into_iter()
        .filter(|definition| doc.define(Rc::clone(definition)))
        .count()
}
