//! Component classes: validated tag + observable list + factory.

use std::fmt;
use std::rc::Rc;

use super::element::ManagedElement;
use super::traits::{Component, ComponentType};
use crate::dom::document::Document;
use crate::dom::node::{is_custom_tag, NodeId};
use crate::dom::registry::{CustomElement, ElementDefinition};
use crate::error::ConfigError;

/// Builds a fresh component instance for each attachment.
pub type ComponentFactory = Rc<dyn Fn() -> Rc<dyn Component>>;

/// An element definition wrapping a component type.
#[derive(Clone)]
pub struct ComponentClass {
    tag: String,
    observed: Vec<String>,
    factory: ComponentFactory,
}

impl ComponentClass {
    /// The class of a statically described component type.
    pub fn of<C: ComponentType>() -> Result<Self, ConfigError> {
        Self::builder()
            .tag(C::TAG)
            .observe(C::OBSERVABLE_PROPERTIES.iter().copied())
            .factory(|| Rc::new(C::create()) as Rc<dyn Component>)
            .build()
    }

    /// Assemble a class at runtime.
    pub fn builder() -> ComponentClassBuilder {
        ComponentClassBuilder::default()
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn observable_properties(&self) -> &[String] {
        &self.observed
    }

    pub(crate) fn instantiate(&self) -> Rc<dyn Component> {
        (self.factory)()
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("tag", &self.tag)
            .field("observed", &self.observed)
            .finish_non_exhaustive()
    }
}

impl ElementDefinition for ComponentClass {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn observed_attributes(&self) -> &[String] {
        &self.observed
    }

    fn construct(&self, doc: &Document, node: NodeId) -> Rc<dyn CustomElement> {
        ManagedElement::new(doc, node, self.clone())
    }
}

/// Builder for [`ComponentClass`]. Every field is required.
#[derive(Default)]
pub struct ComponentClassBuilder {
    tag: Option<String>,
    observed: Option<Vec<String>>,
    factory: Option<ComponentFactory>,
}

impl ComponentClassBuilder {
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn observe<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.observed = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn factory(mut self, factory: impl Fn() -> Rc<dyn Component> + 'static) -> Self {
        self.factory = Some(Rc::new(factory));
        self
    }

    pub fn build(self) -> Result<ComponentClass, ConfigError> {
        let tag = self.tag.ok_or(ConfigError::MissingTag)?;
        validate_tag(&tag)?;
        let observed = self
            .observed
            .ok_or_else(|| ConfigError::MissingObservables { tag: tag.clone() })?;
        validate_properties(&tag, &observed)?;
        let factory = self
            .factory
            .ok_or_else(|| ConfigError::MissingFactory { tag: tag.clone() })?;
        Ok(ComponentClass {
            tag,
            observed,
            factory,
        })
    }
}

/// A custom tag: non-empty, lowercase, hyphenated, starting with a letter.
pub(crate) fn validate_tag(tag: &str) -> Result<(), ConfigError> {
    if tag.is_empty() {
        return Err(ConfigError::MissingTag);
    }
    let valid = tag.starts_with(|c: char| c.is_ascii_lowercase())
        && is_custom_tag(tag)
        && !tag.ends_with('-')
        && tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if !valid {
        return Err(ConfigError::InvalidTag { tag: tag.to_owned() });
    }
    Ok(())
}

fn validate_properties(tag: &str, names: &[String]) -> Result<(), ConfigError> {
    for (index, name) in names.iter().enumerate() {
        let valid = name.starts_with(|c: char| c.is_ascii_lowercase())
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(ConfigError::InvalidProperty {
                tag: tag.to_owned(),
                name: name.clone(),
            });
        }
        if names[..index].contains(name) {
            return Err(ConfigError::DuplicateProperty {
                tag: tag.to_owned(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::any::Any;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::component::ObservedProperties;

    #[derive(Default)]
    struct Blank;

    impl Component for Blank {
        fn template(&self, _props: &ObservedProperties) -> String {
            String::new()
        }
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl ComponentType for Blank {
        const TAG: &'static str = "blank-view";
        const OBSERVABLE_PROPERTIES: &'static [&'static str] = &["label", "count"];
        fn create() -> Self {
            Blank
        }
    }

    fn blank() -> Rc<dyn Component> {
        Rc::new(Blank)
    }

    #[test]
    fn of_static_type() {
        let class = ComponentClass::of::<Blank>().unwrap();
        assert_eq!(class.tag(), "blank-view");
        assert_eq!(class.observed_attributes(), ["label", "count"]);
    }

    #[test]
    fn builder_requires_every_field() {
        assert_eq!(
            ComponentClass::builder().observe(["x"]).factory(blank).build().unwrap_err(),
            ConfigError::MissingTag
        );
        assert_eq!(
            ComponentClass::builder().tag("a-b").factory(blank).build().unwrap_err(),
            ConfigError::MissingObservables { tag: "a-b".into() }
        );
        assert_eq!(
            ComponentClass::builder()
                .tag("a-b")
                .observe(Vec::<String>::new())
                .build()
                .unwrap_err(),
            ConfigError::MissingFactory { tag: "a-b".into() }
        );
    }

    #[test]
    fn tags_must_be_custom() {
        for tag in ["counter", "Count-view", "count-", "-count", "count view"] {
            let err = ComponentClass::builder()
                .tag(tag)
                .observe(["count"])
                .factory(blank)
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidTag { .. }), "{tag}: {err}");
        }
        assert_eq!(
            ComponentClass::builder().tag("").observe(["x"]).factory(blank).build().unwrap_err(),
            ConfigError::MissingTag
        );
    }

    #[test]
    fn property_names_are_checked() {
        let err = ComponentClass::builder()
            .tag("count-view")
            .observe(["count", "Count"])
            .factory(blank)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidProperty { .. }));

        let err = ComponentClass::builder()
            .tag("count-view")
            .observe(["count", "count"])
            .factory(blank)
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateProperty {
                tag: "count-view".into(),
                name: "count".into()
            }
        );
    }
}
