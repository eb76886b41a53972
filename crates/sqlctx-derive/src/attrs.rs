//! `#[orm(...)]` field attributes shared by both derives.

use syn::{Data, DeriveInput, Field, Fields, LitStr, Result};
use syn::punctuated::Punctuated;
use syn::token::Comma;

pub struct FieldAttrs {
    /// Column read by `FromRow`: the declared name, else the field name.
    pub column: String,
    /// Set only by `#[orm(column = "..")]`.
    pub declared: bool,
    pub skip: bool,
}

impl FieldAttrs {
    pub fn parse(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .as_ref()
            .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
        let mut attrs = FieldAttrs {
            column: ident.to_string(),
            declared: false,
            skip: false,
        };

        for attr in &field.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("column") {
                    let lit: LitStr = meta.value()?.parse()?;
                    attrs.column = lit.value();
                    attrs.declared = true;
                    Ok(())
                } else if meta.path.is_ident("skip") {
                    attrs.skip = true;
                    Ok(())
                } else {
                    Err(meta.error("unsupported orm attribute, expected `column` or `skip`"))
                }
            })?;
        }
        Ok(attrs)
    }
}

/// Named fields of a struct, or a spanned error naming `derive`.
pub fn named_fields<'a>(input: &'a DeriveInput, derive: &str) -> Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}
