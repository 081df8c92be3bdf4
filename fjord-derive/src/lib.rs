//! Derive macros for fjord
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod record;

/// Derive `Record`, `Load` and `FromRow` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use fjord::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct Person {
///     id: i64,
///     #[db = "p.name"]
///     name: String,
///     #[db = "-"]
///     scratch: Vec<String>,
///     #[db(embed)]
///     audit: Audit,
/// }
/// ```
///
/// # Attributes
///
/// - `#[db = "name"]` - Map the field to an explicit column name
/// - `#[db = "t.name"]` - Joined-alias form: column `t__name`, or `name`
///   when the prefix is ignored (INSERT)
/// - `#[db = "-"]` - Leave the field out
/// - `#[db(embed)]` - Splice the fields of a nested record (`T` or
///   `Option<T>`) into this one. An `Option<T>` embed is only filled when
///   one of its columns is non-NULL
///
/// Untagged fields use their name converted to snake_case. The struct must
/// implement `Default` so rows can be scanned into fresh values. Generic
/// field types are bounded by the traits their kind needs.
#[proc_macro_derive(Record, attributes(db))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
