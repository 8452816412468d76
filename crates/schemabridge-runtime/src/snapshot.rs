//! JSON schema snapshots.
//!
//! A snapshot is a scan captured to disk: schemas, tables, views, columns,
//! keys and optionally sample rows for enum inference. It is validated
//! against `schemas/Snapshot.schema.json` before use.
//!
//! ```json
//! {
//!   "database": "shop",
//!   "schemas": [{
//!     "name": "public",
//!     "tables": [{
//!       "name": "Orders",
//!       "kind": "TABLE",
//!       "columns": [{"name": "ID", "type": "INTEGER", "is_pk": true}],
//!       "foreign_keys": [],
//!       "sample_rows": [["1"]]
//!     }]
//!   }]
//! }
//! ```

use crate::scanner::{ScannedColumn, ScannedTable, SchemaScanner};
use anyhow::Context;
use schemabridge_core::{ForeignKeyRelation, TableKind};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fs;
use std::path::Path;
use thiserror::Error;

/// JSON Schema every snapshot must satisfy.
pub const SNAPSHOT_SCHEMA: &str = include_str!("../../../schemas/Snapshot.schema.json");

/// Errors that can occur while loading a snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The document does not match the snapshot schema.
    #[error("invalid snapshot: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub database: String,
    pub schemas: Vec<SnapshotSchema>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotSchema {
    pub name: String,
    pub tables: Vec<SnapshotTable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTable {
    pub name: String,

    #[serde(default)]
    pub kind: TableKind,

    #[serde(default)]
    pub pk_name: Option<String>,

    pub columns: Vec<SnapshotColumn>,

    #[serde(default)]
    pub foreign_keys: Vec<SnapshotForeignKey>,

    /// Rows in column order, for enum inference.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sample_rows: Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotColumn {
    pub name: String,

    #[serde(rename = "type")]
    pub data_type: String,

    #[serde(default)]
    pub is_pk: bool,

    #[serde(default)]
    pub is_fk: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotForeignKey {
    pub constrained_columns: Vec<String>,

    /// Defaults to the schema of the constrained table.
    #[serde(default)]
    pub referred_schema: Option<String>,

    pub referred_table: String,
    pub referred_columns: Vec<String>,
}

impl Snapshot {
    /// Load and validate a snapshot file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parse and validate snapshot JSON.
    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let value: JsonValue = serde_json::from_str(content)?;
        validate(&value)?;
        Ok(serde_json::from_value(value)?)
    }

    fn schema(&self, name: &str) -> Option<&SnapshotSchema> {
        self.schemas.iter().find(|s| s.name == name)
    }

    fn table(&self, schema: &str, table: &str) -> Option<&SnapshotTable> {
        self.schema(schema)?.tables.iter().find(|t| t.name == table)
    }

    fn names_of_kind(&self, schema: &str, kind: TableKind) -> anyhow::Result<Vec<String>> {
        let schema = self
            .schema(schema)
            .with_context(|| format!("schema '{schema}' is not in the snapshot"))?;
        Ok(schema
            .tables
            .iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.name.clone())
            .collect())
    }
}

/// Check `value` against [`SNAPSHOT_SCHEMA`], collecting every violation.
pub fn validate(value: &JsonValue) -> Result<(), SnapshotError> {
    let schema: JsonValue = serde_json::from_str(SNAPSHOT_SCHEMA)?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| SnapshotError::Invalid(vec![format!("snapshot schema does not compile: {e}")]))?;

    let problems: Vec<String> = validator
        .iter_errors(value)
        .map(|error| {
            let path = error.instance_path().to_string();
            let location = if path.is_empty() { "(root)".to_string() } else { path };
            format!("{location}: {error}")
        })
        .collect();

    if problems.is_empty() {
        Ok(())
    } else {
        Err(SnapshotError::Invalid(problems))
    }
}

/// [`SchemaScanner`] over a loaded [`Snapshot`].
#[derive(Debug, Clone)]
pub struct SnapshotScanner {
    snapshot: Snapshot,
    database_name: Option<String>,
}

impl SnapshotScanner {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            database_name: None,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        Ok(Self::new(Snapshot::from_file(path)?))
    }

    /// Report `name` instead of the snapshot's database name.
    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = Some(name.into());
        self
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

impl SchemaScanner for SnapshotScanner {
    fn database_name(&self) -> String {
        self.database_name
            .clone()
            .unwrap_or_else(|| self.snapshot.database.clone())
    }

    fn schema_names(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.snapshot.schemas.iter().map(|s| s.name.clone()).collect())
    }

    fn table_names(&self, schema: &str) -> anyhow::Result<Vec<String>> {
        self.snapshot.names_of_kind(schema, TableKind::Table)
    }

    fn view_names(&self, schema: &str) -> anyhow::Result<Vec<String>> {
        self.snapshot.names_of_kind(schema, TableKind::View)
    }

    fn describe(&self, schema: &str, table: &str, _kind: TableKind) -> anyhow::Result<ScannedTable> {
        let snapshot_table = self
            .snapshot
            .table(schema, table)
            .with_context(|| format!("table '{schema}.{table}' is not in the snapshot"))?;

        let columns = snapshot_table
            .columns
            .iter()
            .map(|c| ScannedColumn {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
                is_pk: c.is_pk,
                is_fk: c.is_fk,
            })
            .collect();

        let foreign_keys = snapshot_table
            .foreign_keys
            .iter()
            .map(|fk| {
                ForeignKeyRelation::new(
                    fk.constrained_columns.iter().cloned(),
                    fk.referred_schema.as_deref().unwrap_or(schema),
                    fk.referred_table.as_str(),
                    fk.referred_columns.iter().cloned(),
                )
                .with_context(|| format!("foreign key on '{schema}.{table}'"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(ScannedTable {
            columns,
            pk_name: snapshot_table.pk_name.clone(),
            foreign_keys,
        })
    }

    fn sample_rows(
        &self,
        schema: &str,
        table: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Vec<Option<String>>>> {
        Ok(self
            .snapshot
            .table(schema, table)
            .map(|t| t.sample_rows.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}
