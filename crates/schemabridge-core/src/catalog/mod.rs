//! In-memory schema catalog: Database → Schema → Table → Column.
//!
//! Entities are built wholesale, by a scan or by parsing a cached layout.
//! Afterwards only filter state, embeddings and enum values change. Every
//! container owns a [`FilterStack`](crate::filter::FilterStack) over its
//! children, so filtering never touches the underlying collections.
//!
//! Sibling names are checked at build time: two columns of one table (or two
//! tables of one schema, or two schemas of one database) whose proper names
//! collide are rejected.

mod column;
mod database;
mod error;
mod foreign_key;
mod schema;
mod table;
mod translation;

use std::collections::{BTreeMap, HashMap};

pub use column::{Column, ENUM_TYPE};
pub use database::Database;
pub use error::CatalogError;
pub use foreign_key::ForeignKeyRelation;
pub use schema::Schema;
pub use table::{Table, TableKind};
pub use translation::{SchemaTranslation, TableTranslation, TranslationMap};

/// Container name -> names to exclude from it.
pub type NameFilters = BTreeMap<String, Vec<String>>;

/// Container name -> regex pattern to exclude from it.
pub type PatternFilters = BTreeMap<String, String>;

fn check_proper_names<'a>(
    kind: &'static str,
    container: &str,
    names: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<(), CatalogError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for (name, proper_name) in names {
        if let Some(first) = seen.insert(proper_name, name) {
            return Err(CatalogError::ProperNameCollision {
                kind,
                container: container.to_string(),
                first: first.to_string(),
                second: name.to_string(),
                proper_name: proper_name.to_string(),
            });
        }
    }
    Ok(())
}
