//! Proc macros for cards-ui: `#[derive(ComponentType)]`.
//!
//! This crate is not meant to be used directly. Enable the `macros` feature on `cards-ui`.

use proc_macro::TokenStream;

mod component_derive;

/// Derive `cards_ui::component::ComponentType` for a component.
///
/// The type must implement `Default` (used as `create()`) and
/// `cards_ui::component::Component`. The tag is checked at compile time.
///
/// # Attributes
///
/// - `tag = "..."`: the custom element tag (lowercase, hyphenated)
/// - `observe = ["...", ...]`: observable property names, optional
///
/// # Example
///
/// ```ignore
/// #[derive(Default, ComponentType)]
/// #[component(tag = "count-view", observe = ["count"])]
/// struct CountView;
/// ```
#[proc_macro_derive(ComponentType, attributes(component))]
pub fn derive_component_type(input: TokenStream) -> TokenStream {
    component_derive::derive_impl(input.into())
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
