//! Derive macros for recsql
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod record;
mod sql_ident;

/// Derive `Record` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use recsql::Record;
///
/// #[derive(Record)]
/// struct UserFilter {
///     name: String,
///     age: Option<i32>,
///     #[record(column = "email_address")]
///     email: Option<String>,
///     #[record(skip)]
///     cursor: Option<String>,
/// }
/// ```
///
/// # Generated
///
/// - `field_defs()` - a `const` descriptor table in declaration order
/// - `field_values()` - the current values; empty `Option` fields yield `None`
///
/// # Attributes
///
/// - `#[record(column = "name")]` - Use a different column name (default: snake_case of the field)
/// - `#[record(skip)]` - Leave the field out of every clause
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
