//! FromRow derive macro implementation

use crate::attrs::{FieldAttrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "FromRow")?;

    let mut field_extracts = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        let field_name = &field.ident;
        let column_name = attrs.column;
        field_extracts.push(if attrs.skip {
            quote! { #field_name: ::core::default::Default::default() }
        } else {
            quote! { #field_name: row.try_get(#column_name)? }
        });
    }

    Ok(quote! {
        impl #impl_generics ::sqlctx::FromRow for #name #ty_generics #where_clause {
            fn from_row(row: &::sqlctx::Row) -> ::sqlctx::DbResult<Self> {
                Ok(Self {
                    #(#field_extracts),*
                })
            }
        }
    })
}
