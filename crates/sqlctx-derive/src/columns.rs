//! Columns derive macro implementation

use crate::attrs::{FieldAttrs, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = named_fields(&input, "Columns")?;

    let mut columns = Vec::with_capacity(fields.len());
    for field in fields {
        let attrs = FieldAttrs::parse(field)?;
        // Only declared columns project; none at all renders `*`.
        if attrs.declared && !attrs.skip {
            columns.push(attrs.column);
        }
    }

    Ok(quote! {
        impl #impl_generics ::sqlctx::Columns for #name #ty_generics #where_clause {
            fn columns() -> &'static [&'static str] {
                &[#(#columns),*]
            }
        }
    })
}
