//! Procedural macros for confwalk.
//!
//! - `#[derive(Walk)]` - describe a struct as a record to the crawler

use proc_macro::TokenStream;

mod walk;

/// Implements `confwalk::Walk` for a struct with named fields or a unit
/// struct.
///
/// Every field type must implement `Walk`. Type parameters get a `Walk`
/// bound. Non-`pub` fields are part of the record but read-only: they are
/// never bound as parameters and their contents are not traversed.
///
/// # Field attributes
///
/// - `#[walk(rename = "...")]` - name used in paths and trees instead of the
///   field name
/// - `#[walk(tag = "...")]` - raw tag in `key:"value"` format
/// - `#[walk(embed)]` - promote the fields of this record field for lookup by
///   name
/// - `#[walk(skip)]` - leave the field out of the record
///
/// # Example
///
/// ```ignore
/// #[derive(Walk)]
/// struct Server {
///     #[walk(rename = "Port", tag = r#"env:"PORT""#)]
///     pub port: u16,
///     #[walk(embed)]
///     pub limits: Limits,
///     #[walk(skip)]
///     pub cache: Cache,
/// }
/// ```
#[proc_macro_derive(Walk, attributes(walk))]
pub fn derive_walk(input: TokenStream) -> TokenStream {
    walk::derive_walk_impl(input)
}
