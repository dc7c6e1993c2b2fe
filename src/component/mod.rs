//! Managed components: a component trait, its property proxy, and the host
//! element that owns one component instance per attachment.

pub mod class;
pub mod element;
pub mod properties;
pub mod traits;
pub mod value;

pub use class::{ComponentClass, ComponentClassBuilder, ComponentFactory};
pub use element::{ElementId, ManagedElement};
pub use properties::{ObservedProperties, PropertyListener};
pub use traits::{Component, ComponentContext, ComponentType};
pub use value::Value;
