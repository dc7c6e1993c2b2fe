//! Element tree: slotmap-backed arena, selector queries, upward traversal and
//! the [`Document`] host that ties them to custom-element lifecycles.

pub mod document;
pub mod lifecycle;
pub mod node;
pub mod query;
pub mod registry;
pub mod traverse;
pub mod tree;

pub use document::{Document, WeakDocument};
pub use lifecycle::{ElementState, LifecycleTracker};
pub use node::{NodeData, NodeId};
pub use query::Selector;
pub use registry::{CustomElement, ElementDefinition, ElementRegistry};
pub use traverse::{nearest_ancestor, nearest_custom_ancestor, NodeRef, TreeNode};
pub use tree::Tree;
