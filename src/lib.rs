//! # cards-ui
//!
//! A component-composition framework for interactive widgets built from
//! declarative markup: reusable **components**, attachable behavior
//! **parts**, and composite **cards** that own a template and hear about the
//! components rendered inside them.
//!
//! cards-ui ships its own headless host: an arena-backed element tree with
//! custom-element definitions, lifecycle callbacks, bubbling events and a
//! batched mutation-record queue.
//!
//! ## Core Systems
//!
//! - **[`component`]**: component trait, property proxy, managed element
//! - **[`container`]**: cards and their lifecycle contract
//! - **[`parts`]**: `property-input`, `property-observer`, `on-event`, `script-part`
//! - **[`observe`]**: mutation records and the `ChangeObserver` builder
//! - **[`dom`]**: slotmap-backed tree, selector queries, the host [`Document`]
//! - **[`markup`]**: logos tokenizer, parser and serializer
//! - **[`event`]**: event envelope, listeners, bubbling
//! - **[`timing`]**: tokio-backed debouncing
//! - **[`registry`]**: defining classes on a document
//! - **[`testing`]**: headless harness
//!
//! ## Example
//!
//! ```ignore
//! use cards_ui::prelude::*;
//!
//! let doc = Document::new();
//! registry::register_parts(&doc);
//! registry::define_component::<CountView>(&doc)?;
//! let view = doc.append_markup(doc.body(), r#"<count-view count="1"></count-view>"#)?[0];
//! doc.set_attribute(view, "count", "2");
//! ```

// Foundation
pub mod config;
pub mod error;

// Host
pub mod dom;
pub mod event;
pub mod markup;
pub mod observe;
pub mod timing;

// Composition
pub mod component;
pub mod container;
pub mod parts;
pub mod registry;

// Testing
pub mod testing;

pub use config::RuntimeConfig;
pub use dom::Document;
pub use error::{ConfigError, Error, MarkupError, ObserveError, ScriptError, SelectorError};

// Proc macros (feature-gated)
#[cfg(feature = "macros")]
pub use cards_ui_macros::ComponentType;

/// The types most applications need.
pub mod prelude {
    pub use crate::component::{
        Component, ComponentClass, ComponentContext, ComponentType, ManagedElement,
        ObservedProperties, Value,
    };
    pub use crate::config::RuntimeConfig;
    pub use crate::container::{Container, ContainerClass, ContainerElement, ContainerType};
    pub use crate::dom::{Document, NodeId};
    pub use crate::error::{ConfigError, Error, ScriptError};
    pub use crate::event::{ComponentLifecycle, Event};
    pub use crate::observe::ChangeObserver;
    pub use crate::parts::{ScriptArg, ScriptCall};
    pub use crate::registry;
}
