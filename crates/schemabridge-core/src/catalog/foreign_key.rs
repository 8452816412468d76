use super::CatalogError;
use serde::Serialize;

/// A foreign key edge from a table's columns to columns of another table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyRelation {
    constrained_columns: Vec<String>,
    referred_schema: String,
    referred_table: String,
    referred_columns: Vec<String>,
}

impl ForeignKeyRelation {
    /// Both column lists must be non-empty and of equal length.
    pub fn new<C, R>(
        constrained_columns: C,
        referred_schema: impl Into<String>,
        referred_table: impl Into<String>,
        referred_columns: R,
    ) -> Result<Self, CatalogError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        R: IntoIterator,
        R::Item: Into<String>,
    {
        let constrained_columns: Vec<String> =
            constrained_columns.into_iter().map(Into::into).collect();
        let referred_columns: Vec<String> = referred_columns.into_iter().map(Into::into).collect();
        let referred_table = referred_table.into();

        if constrained_columns.is_empty() || constrained_columns.len() != referred_columns.len() {
            return Err(CatalogError::ForeignKeyArity {
                constrained: constrained_columns.join(","),
                referred_table,
                referred: referred_columns.join(","),
            });
        }

        Ok(Self {
            constrained_columns,
            referred_schema: referred_schema.into(),
            referred_table,
            referred_columns,
        })
    }

    pub fn constrained_columns(&self) -> &[String] {
        &self.constrained_columns
    }

    pub fn referred_schema(&self) -> &str {
        &self.referred_schema
    }

    pub fn referred_table(&self) -> &str {
        &self.referred_table
    }

    pub fn referred_columns(&self) -> &[String] {
        &self.referred_columns
    }
}
