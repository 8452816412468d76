use crate::catalog::CatalogError;

/// Errors raised while parsing layout text. Line numbers are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("line {line}: CREATE SCHEMA is missing its ';' terminator")]
    MissingSchemaTerminator { line: usize },

    #[error("line {line}: CREATE SCHEMA has an empty name")]
    EmptySchemaName { line: usize },

    #[error("line {line}: malformed table header '{header}'")]
    MalformedTableHeader { line: usize, header: String },

    #[error("line {line}: table {table} belongs to undeclared schema '{schema}'")]
    UndeclaredSchema {
        line: usize,
        schema: String,
        table: String,
    },

    #[error("line {line}: table {table} has no column '{column}'")]
    UnknownColumn {
        line: usize,
        table: String,
        column: String,
    },

    #[error("line {line}: malformed primary key clause: {reason}")]
    MalformedKey { line: usize, reason: String },

    #[error("line {line}: malformed foreign key clause: {reason}")]
    MalformedForeignKey { line: usize, reason: String },

    #[error("line {line}: malformed column definition '{definition}'")]
    MalformedColumn { line: usize, definition: String },

    /// A name the layout text cannot carry: reloading it would give a
    /// different catalog.
    #[error("{entity} '{name}' cannot be written to a cached layout: {reason}")]
    Unrepresentable {
        entity: &'static str,
        name: String,
        reason: String,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
