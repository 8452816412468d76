//! Scan collaborator contract and catalog construction.
//!
//! Backends implement [`SchemaScanner`]; [`scan_database`] walks one and
//! builds a [`Database`], optionally inferring enum value sets from sampled
//! rows.

use schemabridge_core::{CatalogError, Column, Database, ForeignKeyRelation, Schema, Table, TableKind};
use std::collections::BTreeSet;
use thiserror::Error;

/// Rows fetched per table for enum inference.
pub const ENUM_SAMPLE_ROWS: usize = 700;

/// Rows examined by the first, cheaper enum check.
pub const ENUM_FIRST_PASS_ROWS: usize = 300;

/// A column as reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedColumn {
    pub name: String,
    pub data_type: String,
    pub is_pk: bool,
    pub is_fk: bool,
}

impl ScannedColumn {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            is_pk: false,
            is_fk: false,
        }
    }

    fn to_column(&self) -> Column {
        let mut column = Column::new(&self.name, &self.data_type);
        if self.is_pk {
            column = column.primary_key();
        }
        if self.is_fk {
            column = column.foreign_key();
        }
        column
    }
}

/// Structure of one table or view as reported by a backend.
#[derive(Debug, Clone, Default)]
pub struct ScannedTable {
    pub columns: Vec<ScannedColumn>,
    pub pk_name: Option<String>,
    pub foreign_keys: Vec<ForeignKeyRelation>,
}

/// Read access to a database's structure.
///
/// Methods return `anyhow::Result` so backends can surface driver errors
/// as they are.
pub trait SchemaScanner {
    /// Name of the scanned database.
    fn database_name(&self) -> String;

    fn schema_names(&self) -> anyhow::Result<Vec<String>>;

    fn table_names(&self, schema: &str) -> anyhow::Result<Vec<String>>;

    fn view_names(&self, schema: &str) -> anyhow::Result<Vec<String>>;

    /// Columns, primary key name and foreign keys of one relation.
    fn describe(&self, schema: &str, table: &str, kind: TableKind) -> anyhow::Result<ScannedTable>;

    /// Up to `limit` rows of `table`, one value per column in `describe`
    /// order. Backends without row access return no rows.
    fn sample_rows(
        &self,
        _schema: &str,
        _table: &str,
        _limit: usize,
    ) -> anyhow::Result<Vec<Vec<Option<String>>>> {
        Ok(Vec::new())
    }
}

/// Errors that can occur while scanning.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The backend failed.
    #[error("scan failed: {0}")]
    Backend(#[from] anyhow::Error),

    /// The scanned structure does not form a valid catalog.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Build a catalog from `scanner`.
///
/// Tables come before views within each schema. Schemas with neither are
/// skipped.
pub fn scan_database(scanner: &dyn SchemaScanner, scan_enums: bool) -> Result<Database, ScanError> {
    let mut database = Database::new(scanner.database_name());

    for schema_name in scanner.schema_names()? {
        let mut tables = Vec::new();
        for kind in [TableKind::Table, TableKind::View] {
            let names = match kind {
                TableKind::Table => scanner.table_names(&schema_name)?,
                TableKind::View => scanner.view_names(&schema_name)?,
            };
            for name in names {
                tables.push(scan_table(scanner, &schema_name, &name, kind, scan_enums)?);
            }
        }

        if tables.is_empty() {
            tracing::debug!(schema = %schema_name, "Skipping empty schema");
            continue;
        }
        database.register_schema(Schema::new(schema_name, tables)?)?;
    }

    tracing::info!(
        database = %database.name(),
        schemas = database.all_schemas().len(),
        "Scanned database"
    );
    Ok(database)
}

fn scan_table(
    scanner: &dyn SchemaScanner,
    schema: &str,
    table: &str,
    kind: TableKind,
    scan_enums: bool,
) -> Result<Table, ScanError> {
    let scanned = scanner.describe(schema, table, kind)?;
    let mut columns: Vec<Column> = scanned.columns.iter().map(ScannedColumn::to_column).collect();

    if scan_enums && columns.iter().any(|c| is_text_type(c.data_type())) {
        let rows = scanner.sample_rows(schema, table, ENUM_SAMPLE_ROWS)?;
        for (index, column) in columns.iter_mut().enumerate() {
            if !is_text_type(column.data_type()) {
                continue;
            }
            let values: Vec<Option<String>> = rows
                .iter()
                .map(|row| row.get(index).cloned().flatten())
                .collect();
            if let Some(enum_values) = infer_enum_values(&values) {
                tracing::debug!(
                    table = %table,
                    column = %column.name(),
                    values = enum_values.len(),
                    "Inferred enum column"
                );
                column.set_enum_values(enum_values);
            }
        }
    }

    Ok(Table::new(
        table,
        kind,
        scanned.pk_name,
        columns,
        scanned.foreign_keys,
    )?)
}

/// Character types are the only enum candidates.
fn is_text_type(data_type: &str) -> bool {
    let data_type = data_type.to_ascii_lowercase();
    ["char", "text", "string"]
        .iter()
        .any(|marker| data_type.contains(marker))
}

/// Decide whether sampled column values form a small closed set.
///
/// The bound is 10% of the larger of [`ENUM_FIRST_PASS_ROWS`] and the sample
/// size. The first [`ENUM_FIRST_PASS_ROWS`] values must stay within it by
/// distinct count; the whole sample (at most [`ENUM_SAMPLE_ROWS`] values)
/// must stay within it counting distinct values plus empty strings.
///
/// Returns the distinct non-empty values, sorted.
pub fn infer_enum_values(values: &[Option<String>]) -> Option<Vec<String>> {
    let values = &values[..values.len().min(ENUM_SAMPLE_ROWS)];
    let comparison = ENUM_FIRST_PASS_ROWS.max(values.len());
    let within_bound = |count: usize| count * 10 <= comparison;

    let first_pass: BTreeSet<Option<&str>> = values
        .iter()
        .take(ENUM_FIRST_PASS_ROWS)
        .map(Option::as_deref)
        .collect();
    if !within_bound(first_pass.len()) {
        return None;
    }

    let distinct: BTreeSet<Option<&str>> = values.iter().map(Option::as_deref).collect();
    let empty = values.iter().filter(|v| v.as_deref() == Some("")).count();
    if !within_bound(distinct.len() + empty) {
        return None;
    }

    let enum_values: Vec<String> = distinct
        .into_iter()
        .flatten()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!enum_values.is_empty()).then_some(enum_values)
}
