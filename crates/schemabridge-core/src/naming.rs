//! Proper-name normalization.
//!
//! Every database, schema, table and column carries its original name plus a
//! "proper" name: lowercase, with spaces, dashes and dots folded to `_`. The
//! proper names are what a language model sees; the originals are what the
//! database accepts.

/// Normalize an identifier into its proper form.
///
/// Total and idempotent: `normalize_name(&normalize_name(x)) == normalize_name(x)`.
pub fn normalize_name(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            ' ' | '-' | '.' => '_',
            other => other,
        })
        .collect()
}
