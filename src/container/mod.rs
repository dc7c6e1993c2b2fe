//! Containers ("cards"): template owners that hear component lifecycle
//! events from their descendants.

pub mod element;
pub mod traits;

pub use element::ContainerElement;
pub use traits::{Container, ContainerClass, ContainerFactory, ContainerType};
