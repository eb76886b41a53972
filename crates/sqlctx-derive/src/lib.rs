//! Derive macros for sqlctx
//!
//! Provides `#[derive(FromRow)]` and `#[derive(Columns)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod columns;
mod from_row;

/// Derive `FromRow` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqlctx::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     name: String,
///     #[orm(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(skip)]` - Do not read the field; it is filled with `Default::default()`
#[proc_macro_derive(FromRow, attributes(orm))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Columns`, the projection used when a select has no explicit one.
///
/// # Example
///
/// ```ignore
/// use sqlctx::Columns;
///
/// #[derive(Columns)]
/// struct User {
///     #[orm(column = "id")]
///     id: i64,
///     #[orm(column = "user_name")]
///     name: String,
///     cached: bool,
/// }
///
/// assert_eq!(User::columns(), &["id", "user_name"]);
/// ```
///
/// Only fields with a declared column are listed; a struct without any
/// yields an empty list, which selects `*`.
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Include the field under this column name
/// - `#[orm(skip)]` - Leave the field out even if a column is declared
#[proc_macro_derive(Columns, attributes(orm))]
pub fn derive_columns(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    columns::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
