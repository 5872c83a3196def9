//! # flysbe derive
//!
//! Procedural macros for flysbe.
//!
//! `#[derive(EnumName)]` implements `flysbe_core::NamedEnum` for a fieldless
//! enum so it can be carried on the wire by name.

use std::collections::HashSet;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, LitStr, parse_macro_input};

/// Derives `NamedEnum` for a fieldless enum.
///
/// The wire name defaults to the variant identifier and can be overridden
/// with `#[sbe(name = "...")]`.
///
/// # Example
/// ```ignore
/// #[derive(Clone, Copy, PartialEq, EnumName)]
/// enum Side {
///     Buy,
///     Sell,
///     #[sbe(name = "SELL_SHORT")]
///     SellShort,
/// }
/// ```
#[proc_macro_derive(EnumName, attributes(sbe))]
pub fn derive_enum_name(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_enum_name(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_enum_name(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let Data::Enum(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "EnumName can only be derived for enums",
        ));
    };
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "EnumName does not support generic enums",
        ));
    }

    let mut idents = Vec::with_capacity(data.variants.len());
    let mut wire_names = Vec::with_capacity(data.variants.len());
    let mut seen = HashSet::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new_spanned(
                variant,
                "EnumName variants cannot carry fields",
            ));
        }
        let mut wire_name = variant.ident.to_string();
        for attr in variant.attrs.iter().filter(|a| a.path().is_ident("sbe")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let lit: LitStr = meta.value()?.parse()?;
                    wire_name = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("unsupported sbe attribute, expected `name`"))
                }
            })?;
        }
        if !wire_name.is_ascii() {
            return Err(syn::Error::new_spanned(
                variant,
                "EnumName wire names must be ASCII",
            ));
        }
        if !seen.insert(wire_name.clone()) {
            return Err(syn::Error::new_spanned(
                variant,
                format!("duplicate EnumName wire name `{wire_name}`"),
            ));
        }
        idents.push(&variant.ident);
        wire_names.push(wire_name);
    }

    Ok(quote! {
        impl ::flysbe_core::enums::NamedEnum for #name {
            const VARIANTS: &'static [Self] = &[#(Self::#idents),*];

            fn name(&self) -> &'static str {
                match *self {
                    #(Self::#idents => #wire_names,)*
                }
            }
        }
    })
}
