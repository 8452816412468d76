//! Database dialects known to schemabridge.
//!
//! The dialect decides two things the translator cares about: how an
//! identifier is quoted when it is written back into a statement, and which
//! schema an unqualified table name belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported database dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlDialect {
    #[serde(rename = "PostgreSQL", alias = "postgres", alias = "postgresql")]
    PostgreSql,
    #[serde(rename = "MySQL", alias = "mysql")]
    MySql,
    #[serde(rename = "Oracle", alias = "oracle")]
    Oracle,
    #[serde(rename = "MsSql", alias = "mssql", alias = "tsql")]
    MsSql,
    #[serde(rename = "SQLite", alias = "sqlite")]
    Sqlite,
    #[serde(rename = "BigQuery", alias = "bigquery")]
    BigQuery,
    #[serde(rename = "Redshift", alias = "redshift")]
    Redshift,
}

impl SqlDialect {
    /// All dialects, in declaration order.
    pub const ALL: [SqlDialect; 7] = [
        SqlDialect::PostgreSql,
        SqlDialect::MySql,
        SqlDialect::Oracle,
        SqlDialect::MsSql,
        SqlDialect::Sqlite,
        SqlDialect::BigQuery,
        SqlDialect::Redshift,
    ];

    /// Display name, also used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSql => "PostgreSQL",
            SqlDialect::MySql => "MySQL",
            SqlDialect::Oracle => "Oracle",
            SqlDialect::MsSql => "MsSql",
            SqlDialect::Sqlite => "SQLite",
            SqlDialect::BigQuery => "BigQuery",
            SqlDialect::Redshift => "Redshift",
        }
    }

    /// Opening and closing identifier delimiters.
    ///
    /// - PostgreSQL/Oracle/SQLite/Redshift: `"identifier"`
    /// - MySQL/BigQuery: `` `identifier` ``
    /// - MsSql: `[identifier]`
    pub fn identifier_delimiters(&self) -> (char, char) {
        match self {
            SqlDialect::MsSql => ('[', ']'),
            SqlDialect::MySql | SqlDialect::BigQuery => ('`', '`'),
            _ => ('"', '"'),
        }
    }

    /// Quote an identifier, doubling any embedded closing delimiter.
    pub fn quote_identifier(&self, ident: &str) -> String {
        let (open, close) = self.identifier_delimiters();
        let escaped = ident.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Conventional default schema for unqualified table names.
    ///
    /// SQLite has no schemas and BigQuery uses datasets, so neither has one.
    pub fn default_schema(&self) -> Option<&'static str> {
        match self {
            SqlDialect::PostgreSql | SqlDialect::Redshift => Some("public"),
            SqlDialect::MySql => Some("mysql"),
            SqlDialect::Oracle => Some("SYS"),
            SqlDialect::MsSql => Some("dbo"),
            SqlDialect::Sqlite | SqlDialect::BigQuery => None,
        }
    }

    /// Secondary default schema, used when the primary one is absent.
    ///
    /// Only Oracle has one: accounts without `SYS` access land in `SYSTEM`.
    pub fn fallback_schema(&self) -> Option<&'static str> {
        match self {
            SqlDialect::Oracle => Some("SYSTEM"),
            _ => None,
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a dialect name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SQL dialect: {0}")]
pub struct UnknownDialect(pub String);

impl FromStr for SqlDialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" => Ok(SqlDialect::PostgreSql),
            "mysql" => Ok(SqlDialect::MySql),
            "oracle" => Ok(SqlDialect::Oracle),
            "mssql" | "tsql" | "microsoft sql server" => Ok(SqlDialect::MsSql),
            "sqlite" => Ok(SqlDialect::Sqlite),
            "bigquery" => Ok(SqlDialect::BigQuery),
            "redshift" => Ok(SqlDialect::Redshift),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(SqlDialect::PostgreSql.quote_identifier("Col 1"), "\"Col 1\"");
        assert_eq!(SqlDialect::MsSql.quote_identifier("Col 1"), "[Col 1]");
        assert_eq!(SqlDialect::MySql.quote_identifier("Col 1"), "`Col 1`");
        assert_eq!(SqlDialect::PostgreSql.quote_identifier("a\"b"), "\"a\"\"b\"");
        assert_eq!(SqlDialect::MsSql.quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn test_default_schemas() {
        assert_eq!(SqlDialect::PostgreSql.default_schema(), Some("public"));
        assert_eq!(SqlDialect::MsSql.default_schema(), Some("dbo"));
        assert_eq!(SqlDialect::Oracle.default_schema(), Some("SYS"));
        assert_eq!(SqlDialect::Oracle.fallback_schema(), Some("SYSTEM"));
        assert_eq!(SqlDialect::Sqlite.default_schema(), None);
    }

    #[test]
    fn test_parse_names() {
        for dialect in SqlDialect::ALL {
            assert_eq!(dialect.name().parse::<SqlDialect>().unwrap(), dialect);
        }
        assert_eq!("tsql".parse::<SqlDialect>().unwrap(), SqlDialect::MsSql);
        assert!("cobol".parse::<SqlDialect>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let dialect: SqlDialect = serde_yaml::from_str("MsSql").unwrap();
        assert_eq!(dialect, SqlDialect::MsSql);
        let dialect: SqlDialect = serde_yaml::from_str("postgres").unwrap();
        assert_eq!(dialect, SqlDialect::PostgreSql);
    }
}
