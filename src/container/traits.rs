//! The container trait and container classes.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use super::element::ContainerElement;
use crate::component::class::validate_tag;
use crate::dom::document::Document;
use crate::dom::node::NodeId;
use crate::dom::registry::{CustomElement, ElementDefinition};
use crate::error::ConfigError;
use crate::event::ComponentLifecycle;

/// Coarse-grained owner of a template and of the components rendered from it.
pub trait Container: 'static {
    /// Markup rendered into the container's content slot. A `<template>`
    /// child present at attachment takes precedence.
    fn template(&self) -> String;

    /// Attachment, before the lifecycle listeners go in and before rendering.
    fn on_connected(&self, _doc: &Document, _card: &ContainerElement) {}

    /// A descendant component finished attaching.
    fn on_component_ready(&self, _doc: &Document, _card: &ContainerElement, _detail: &ComponentLifecycle) {}

    /// A descendant component detached.
    fn on_component_removed(&self, _doc: &Document, _card: &ContainerElement, _detail: &ComponentLifecycle) {}

    fn as_any(&self) -> &dyn Any;
}

/// A container type with a static tag, usable with [`ContainerClass::of`].
pub trait ContainerType: Container + Sized {
    const TAG: &'static str;

    fn create() -> Self;
}

/// Builds the container instance for each upgraded node.
pub type ContainerFactory = Rc<dyn Fn() -> Rc<dyn Container>>;

/// An element definition wrapping a container type.
#[derive(Clone)]
pub struct ContainerClass {
    tag: String,
    factory: ContainerFactory,
}

impl ContainerClass {
    pub fn of<K: ContainerType>() -> Result<Self, ConfigError> {
        Self::new(K::TAG, || Rc::new(K::create()) as Rc<dyn Container>)
    }

    pub fn new(
        tag: impl Into<String>,
        factory: impl Fn() -> Rc<dyn Container> + 'static,
    ) -> Result<Self, ConfigError> {
        let tag = tag.into();
        validate_tag(&tag)?;
        Ok(Self {
            tag,
            factory: Rc::new(factory),
        })
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub(crate) fn instantiate(&self) -> Rc<dyn Container> {
        (self.factory)()
    }
}

impl fmt::Debug for ContainerClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerClass")
            .field("tag", &self.tag)
            .finish_non_exhaustive()
    }
}

impl ElementDefinition for ContainerClass {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn observed_attributes(&self) -> &[String] {
        &[]
    }

    fn construct(&self, doc: &Document, node: NodeId) -> Rc<dyn CustomElement> {
        ContainerElement::new(doc, node, self.clone())
    }
}
