//! Proc macros for the next-store crate.
//!
//! This crate provides the `#[derive(Record)]` macro

use proc_macro::TokenStream;
use quote::quote;
use syn::{
    Data, DeriveInput, Expr, Fields, GenericArgument, Lit, PathArguments, Type,
    parse_macro_input, spanned::Spanned,
};

/// Options parsed from the `#[record(...)]` attribute.
struct RecordOptions {
    version: Option<(u32, proc_macro2::Span)>,
}

impl RecordOptions {
    fn from_attrs(attrs: &[syn::Attribute]) -> syn::Result<Self> {
        let mut version = None;

        for attr in attrs {
            if attr.path().is_ident("record") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("version") {
                        let value: Expr = meta.value()?.parse()?;
                        match value {
                            Expr::Lit(syn::ExprLit {
                                lit: Lit::Int(lit_int),
                                ..
                            }) => {
                                version = Some((lit_int.base10_parse::<u32>()?, lit_int.span()));
                            }
                            other => {
                                return Err(syn::Error::new(
                                    other.span(),
                                    "version must be an integer literal",
                                ));
                            }
                        }
                    } else {
                        return Err(syn::Error::new(
                            meta.path.span(),
                            format!("unknown record attribute: {:?}", meta.path.get_ident()),
                        ));
                    }
                    Ok(())
                })?;
            }
        }

        Ok(Self { version })
    }
}

/// Extracts `N` from a field type spelled `Version<N>` (optionally path-qualified).
fn literal_version(ty: &Type) -> syn::Result<Option<u32>> {
    let Type::Path(type_path) = ty else {
        return Ok(None);
    };
    let Some(segment) = type_path.path.segments.last() else {
        return Ok(None);
    };
    if segment.ident != "Version" {
        return Ok(None);
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return Ok(None);
    };

    for arg in &args.args {
        let expr = match arg {
            GenericArgument::Const(expr) => expr,
            _ => continue,
        };
        if let Expr::Lit(syn::ExprLit {
            lit: Lit::Int(lit_int),
            ..
        }) = expr
        {
            return lit_int.base10_parse::<u32>().map(Some);
        }
    }

    Ok(None)
}

/// Derive macro for the `Record` trait.
///
/// The struct must have named fields, one of them called `version`. The
/// record version is taken from the type of that field when it is
/// `Version<N>`, or from `#[record(version = N)]` otherwise.
///
/// Only a `Version<N>` field makes validation reject files declaring another
/// version. With the attribute and a plain integer field, any numeric
/// `version` deserializes, and a migration or custom deserializer has to
/// check it.
///
/// # Example
///
/// ```rust,ignore
/// use next_store::{Record, Version};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Default, Serialize, Deserialize, Record)]
/// #[serde(default)]
/// struct AppState {
///     version: Version<1>,
///     theme: String,
/// }
///
/// assert_eq!(<AppState as next_store::Record>::VERSION, 1);
/// ```
///
/// This expands to roughly:
///
/// ```rust,ignore
/// impl next_store::Record for AppState {
///     const VERSION: u32 = 1;
/// }
/// ```
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive_record_impl(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn derive_record_impl(input: DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let options = RecordOptions::from_attrs(&input.attrs)?;
    let name = &input.ident;

    let Data::Struct(data) = &input.data else {
        return Err(syn::Error::new(input.span(), "Record can only be derived for structs"));
    };
    let Fields::Named(fields) = &data.fields else {
        return Err(syn::Error::new(data.fields.span(), "Record requires a struct with named fields"));
    };

    let version_field = fields
        .named
        .iter()
        .find(|field| field.ident.as_ref().is_some_and(|ident| *ident == "version"))
        .ok_or_else(|| {
            syn::Error::new(name.span(), "record types must contain a `version` field")
        })?;

    let from_type = literal_version(&version_field.ty)?;

    let version = match (from_type, options.version) {
        (Some(typed), Some((attr, span))) if typed != attr => {
            return Err(syn::Error::new(
                span,
                format!(
                    "#[record(version = {attr})] disagrees with the `version` field type Version<{typed}>"
                ),
            ));
        }
        (Some(version), _) | (None, Some((version, _))) => version,
        (None, None) => {
            return Err(syn::Error::new(
                version_field.ty.span(),
                "missing record version: use `version: Version<N>` or #[record(version = N)]",
            ));
        }
    };

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::next_store::Record for #name #ty_generics #where_clause {
            const VERSION: u32 = #version;
        }
    })
}
