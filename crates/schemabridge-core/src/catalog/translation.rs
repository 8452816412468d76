//! Proper-name to original-name lookup consumed by the query translator.
//!
//! The JSON form is shared with external callers that store the map next to a
//! cached layout:
//!
//! ```json
//! {"pub": {"name": "pub", "Tables": {"t1_space": {"name": "T1 SPACE", "Columns": {"col1_space": "Col1 SPACE"}}}}}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Original names of one table, keyed by proper names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableTranslation {
    /// Original table name.
    pub name: String,
    /// Column proper name -> original column name.
    #[serde(rename = "Columns", default)]
    pub columns: BTreeMap<String, String>,
}

/// Original names of one schema, keyed by proper names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaTranslation {
    /// Original schema name.
    pub name: String,
    /// Table proper name -> table translation.
    #[serde(rename = "Tables", default)]
    pub tables: BTreeMap<String, TableTranslation>,
}

/// Schema proper name -> schema translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationMap {
    schemas: BTreeMap<String, SchemaTranslation>,
}

impl TranslationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_schema(&mut self, proper_name: impl Into<String>, schema: SchemaTranslation) {
        self.schemas.insert(proper_name.into(), schema);
    }

    pub fn schema(&self, proper_name: &str) -> Option<&SchemaTranslation> {
        self.schemas.get(proper_name)
    }

    pub fn contains_schema(&self, proper_name: &str) -> bool {
        self.schemas.contains_key(proper_name)
    }

    pub fn table(&self, schema: &str, table: &str) -> Option<&TableTranslation> {
        self.schema(schema)?.tables.get(table)
    }

    /// Original column name for a proper `schema.table.column` triple.
    pub fn column(&self, schema: &str, table: &str, column: &str) -> Option<&str> {
        self.table(schema, table)?
            .columns
            .get(column)
            .map(String::as_str)
    }

    /// Proper schema names, sorted.
    pub fn schema_names(&self) -> impl Iterator<Item = &str> {
        self.schemas.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
