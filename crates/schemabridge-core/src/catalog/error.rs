//! Errors raised while building a catalog.

/// Structural problems detected when entities are constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// Two siblings normalize to the same proper name.
    #[error("{kind} '{first}' and '{second}' in {container} both normalize to '{proper_name}'")]
    ProperNameCollision {
        kind: &'static str,
        container: String,
        first: String,
        second: String,
        proper_name: String,
    },

    /// Constrained and referred column lists differ in length (or are empty).
    #[error(
        "foreign key ({constrained}) -> {referred_table}({referred}) must map the same non-zero number of columns"
    )]
    ForeignKeyArity {
        constrained: String,
        referred_table: String,
        referred: String,
    },

    /// A foreign key constrains a column the table does not have.
    #[error("foreign key on table '{table}' constrains unknown column '{column}'")]
    UnknownForeignKeyColumn { table: String, column: String },

    /// A primary key name was given but no column is part of the key.
    #[error("table '{table}' names primary key '{pk_name}' but has no primary key columns")]
    NamedKeyWithoutColumns { table: String, pk_name: String },
}
