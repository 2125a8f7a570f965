// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// Field as exposed through `Serializable::attr`.
struct FieldInfo {
    ident: syn::Ident,
    key: String,
}

/// `#[derive(Serializable)]` macro: generates `Serializable`, `ToObject` and
/// `FromObject` impls for an annotated struct.
///
/// Attributes:
/// - container `#[serializable(class = "path::to_fn")]` (required): a
///   function returning the bound `Arc<Class>`
/// - field `#[serializable(rename = "key")]`: expose the field under `key`
/// - field `#[serializable(skip)]`: do not expose the field
///
/// The struct must implement `Clone` and `Debug`.
///
/// Example:
/// ```ignore
/// #[derive(Debug, Clone, Serializable)]
/// #[serializable(class = "simple_class")]
/// struct Simple {
///     exposure: f64,
///     path: String,
///     #[serializable(skip)]
///     handle: Option<u32>,
/// }
/// ```
#[proc_macro_derive(Serializable, attributes(serializable))]
pub fn derive_serializable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            Fields::Unit => return Err(syn::Error::new_spanned(input, "Unit structs are not supported")),
            Fields::Unnamed(_) => {
                return Err(syn::Error::new_spanned(input, "Only named fields are supported"))
            }
        },
        _ => return Err(syn::Error::new_spanned(input, "Only structs are supported")),
    };

    let class_fn = parse_container_attrs(input)?;

    let mut infos = Vec::new();
    for field in fields {
        let Some(ident) = field.ident.clone() else {
            return Err(syn::Error::new_spanned(field, "Field must have a name"));
        };
        let mut key = ident.to_string();
        let mut skip = false;
        for attr in &field.attrs {
            if !attr.path().is_ident("serializable") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let lit: LitStr = meta.value()?.parse()?;
                    key = lit.value();
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("expected `rename = \"...\"` or `skip`"))
                }
            })?;
        }
        if !skip {
            infos.push(FieldInfo { ident, key });
        }
    }

    let arms = infos.iter().map(|f| {
        let ident = &f.ident;
        let key = &f.key;
        quote! {
            #key => ::core::option::Option::Some(::typeslot::ToObject::to_object(&self.#ident)),
        }
    });

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::typeslot::object::Serializable for #name #ty_generics #where_clause {
            fn class(&self) -> ::std::sync::Arc<::typeslot::Class> {
                #class_fn()
            }

            fn attr(&self, name: &str) -> ::core::option::Option<::typeslot::Object> {
                match name {
                    #(#arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl #impl_generics ::typeslot::ToObject for #name #ty_generics #where_clause {
            fn to_object(&self) -> ::typeslot::Object {
                ::typeslot::Object::Instance(::std::sync::Arc::new(::core::clone::Clone::clone(self)))
            }
        }

        impl #impl_generics ::typeslot::FromObject for #name #ty_generics #where_clause {
            const TYPE_NAME: &'static str = #type_name;

            fn from_object(value: ::typeslot::Object) -> ::core::option::Option<Self> {
                match value {
                    ::typeslot::Object::Instance(inst) => inst.downcast_ref::<Self>().cloned(),
                    _ => ::core::option::Option::None,
                }
            }
        }
    })
}

/// Parse `#[serializable(class = "path")]`.
fn parse_container_attrs(input: &DeriveInput) -> syn::Result<syn::Path> {
    let mut class_fn: Option<syn::Path> = None;
    for attr in &input.attrs {
        if !attr.path().is_ident("serializable") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("class") {
                let lit: LitStr = meta.value()?.parse()?;
                class_fn = Some(lit.parse()?);
                Ok(())
            } else {
                Err(meta.error("expected `class = \"...\"`"))
            }
        })?;
    }
    class_fn.ok_or_else(|| {
        syn::Error::new_spanned(
            &input.ident,
            "missing #[serializable(class = \"...\")] naming the class function",
        )
    })
}
