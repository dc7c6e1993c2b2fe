//! `ComponentType` derive: read `#[component(...)]` and emit the constants.

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::punctuated::Punctuated;
use syn::{DeriveInput, Error, LitStr, Result, Token};

/// Parsed `#[component(...)]` arguments.
#[derive(Debug, Default)]
pub(crate) struct ComponentArgs {
    pub tag: Option<LitStr>,
    pub observe: Vec<LitStr>,
}

pub(crate) fn derive_impl(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let args = parse_args(&input)?;

    let tag = args
        .tag
        .ok_or_else(|| Error::new(Span::call_site(), "missing `#[component(tag = \"...\")]`"))?;
    if let Err(message) = check_tag(&tag.value()) {
        return Err(Error::new(tag.span(), message));
    }
    for (index, name) in args.observe.iter().enumerate() {
        if args.observe[..index].iter().any(|prior| prior.value() == name.value()) {
            return Err(Error::new(
                name.span(),
                format!("property `{}` is listed twice", name.value()),
            ));
        }
    }

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let observe = &args.observe;
    Ok(quote! {
        impl #impl_generics ::cards_ui::component::ComponentType for #ident #ty_generics #where_clause {
            const TAG: &'static str = #tag;
            const OBSERVABLE_PROPERTIES: &'static [&'static str] = &[#(#observe),*];

            fn create() -> Self {
                <Self as ::core::default::Default>::default()
            }
        }
    })
}

fn parse_args(input: &DeriveInput) -> Result<ComponentArgs> {
    let mut args = ComponentArgs::default();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("tag") {
                args.tag = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("observe") {
                let value = meta.value()?;
                let content;
                syn::bracketed!(content in value);
                let names = Punctuated::<LitStr, Token![,]>::parse_terminated(&content)?;
                args.observe.extend(names);
                Ok(())
            } else {
                Err(meta.error("expected `tag` or `observe`"))
            }
        })?;
    }
    Ok(args)
}

/// Same rule the runtime applies: lowercase, hyphenated, starting with a letter.
fn check_tag(tag: &str) -> std::result::Result<(), String> {
    if tag.is_empty() {
        return Err("tag must not be empty".into());
    }
    if !tag.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(format!("tag `{tag}` must start with a lowercase letter"));
    }
    if !tag.contains('-') || tag.ends_with('-') {
        return Err(format!("tag `{tag}` must contain an inner hyphen"));
    }
    if !tag.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
        return Err(format!("tag `{tag}` may only contain a-z, 0-9 and `-`"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::quote;

    fn expand(tokens: TokenStream) -> Result<String> {
        derive_impl(tokens).map(|out| out.to_string())
    }

    #[test]
    fn emits_constants() {
        let out = expand(quote! {
            #[component(tag = "count-view", observe = ["count", "step"])]
            struct CountView;
        })
        .unwrap();
        assert!(out.contains("ComponentType for CountView"));
        assert!(out.contains("\"count-view\""));
        assert!(out.contains("\"count\""));
        assert!(out.contains("\"step\""));
    }

    #[test]
    fn observe_is_optional() {
        let out = expand(quote! {
            #[component(tag = "plain-view")]
            struct PlainView;
        })
        .unwrap();
        assert!(out.contains("OBSERVABLE_PROPERTIES"));
    }

    #[test]
    fn missing_tag() {
        let err = expand(quote! { struct NoTag; }).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn tag_without_hyphen() {
        let err = expand(quote! {
            #[component(tag = "counter")]
            struct Counter;
        })
        .unwrap_err();
        assert!(err.to_string().contains("hyphen"));
    }

    #[test]
    fn duplicate_property() {
        let err = expand(quote! {
            #[component(tag = "count-view", observe = ["count", "count"])]
            struct CountView;
        })
        .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn unknown_key() {
        let err = expand(quote! {
            #[component(name = "x-y")]
            struct Named;
        })
        .unwrap_err();
        assert!(err.to_string().contains("expected"));
    }

    #[test]
    fn check_tag_rules() {
        assert!(check_tag("todo-item").is_ok());
        assert!(check_tag("").is_err());
        assert!(check_tag("Todo-item").is_err());
        assert!(check_tag("todo-").is_err());
        assert!(check_tag("todo_item-x").is_err());
    }
}
