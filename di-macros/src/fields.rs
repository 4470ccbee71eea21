//! Field inspection shared by both derives.

use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Attribute, Data, DeriveInput, Field, Fields, Ident, LitStr, Type};

/// Returns the named fields of a struct, or a spanned error for anything else.
pub fn named<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> syn::Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} requires a struct with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// Field identifier; named fields always carry one.
pub fn ident(field: &Field) -> syn::Result<&Ident> {
    field
        .ident
        .as_ref()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))
}

/// True when `#[<attr>(<flag>)]` is present.
pub fn has_flag(attrs: &[Attribute], attr: &str, flag: &str) -> syn::Result<bool> {
    let mut found = false;
    for a in attrs.iter().filter(|a| a.path().is_ident(attr)) {
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident(flag) {
                found = true;
                Ok(())
            } else {
                Err(meta.error(format!("unsupported {attr} option")))
            }
        })?;
    }
    Ok(found)
}

/// Reads `#[from_context(Context = "Type")]` from the container attributes.
pub fn context_type(attrs: &[Attribute]) -> syn::Result<Option<Type>> {
    let mut ty = None;
    for a in attrs.iter().filter(|a| a.path().is_ident("from_context")) {
        a.parse_nested_meta(|meta| {
            if meta.path.is_ident("Context") {
                let lit: LitStr = meta.value()?.parse()?;
                ty = Some(lit.parse::<Type>()?);
                Ok(())
            } else {
                Err(meta.error("expected `Context = \"Type\"`"))
            }
        })?;
    }
    Ok(ty)
}
