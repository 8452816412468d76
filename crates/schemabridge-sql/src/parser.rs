//! SQL parsing and reference collection.

use crate::error::TranslateError;
use schemabridge_core::SqlDialect;
use sqlparser::ast::{Expr, Ident, ObjectName, ObjectNamePart, Query, Statement, Visitor};
use sqlparser::dialect::{
    BigQueryDialect, Dialect, GenericDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect,
    RedshiftSqlDialect, SQLiteDialect,
};
use sqlparser::parser::Parser;
use std::ops::ControlFlow;

/// Parses SQL with the grammar of one [`SqlDialect`].
#[derive(Debug)]
pub struct SqlAnalyzer {
    dialect: SqlDialect,
    grammar: Box<dyn Dialect>,
}

impl Clone for SqlAnalyzer {
    fn clone(&self) -> Self {
        Self::new(self.dialect)
    }
}

impl Default for SqlAnalyzer {
    fn default() -> Self {
        Self::new(SqlDialect::PostgreSql)
    }
}

impl SqlAnalyzer {
    /// Create an analyzer for `dialect`.
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            grammar: grammar_for(dialect),
        }
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Parse a SQL string into statements.
    pub fn parse(&self, sql: &str) -> Result<Vec<Statement>, TranslateError> {
        Parser::parse_sql(self.grammar.as_ref(), sql).map_err(|e| TranslateError::Parse(e.to_string()))
    }
}

/// sqlparser grammar closest to each dialect. Oracle has no dedicated
/// grammar and parses with the generic one.
fn grammar_for(dialect: SqlDialect) -> Box<dyn Dialect> {
    match dialect {
        SqlDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
        SqlDialect::MySql => Box::new(MySqlDialect {}),
        SqlDialect::MsSql => Box::new(MsSqlDialect {}),
        SqlDialect::Sqlite => Box::new(SQLiteDialect {}),
        SqlDialect::BigQuery => Box::new(BigQueryDialect {}),
        SqlDialect::Redshift => Box::new(RedshiftSqlDialect {}),
        SqlDialect::Oracle => Box::new(GenericDialect {}),
    }
}

/// Identifier parts of an object name, skipping non-identifier parts.
pub(crate) fn object_name_idents(name: &ObjectName) -> Vec<&Ident> {
    name.0
        .iter()
        .filter_map(|part| match part {
            ObjectNamePart::Identifier(ident) => Some(ident),
            _ => None,
        })
        .collect()
}

/// A column reference found in an expression: one to three identifier parts.
#[derive(Debug, Clone)]
pub(crate) struct ColumnReference {
    pub idents: Vec<Ident>,
    /// Set for HAVING and ORDER BY, where output aliases are in scope.
    pub alias_context: bool,
}

/// Collects the column references of one query level.
///
/// Nested queries are not descended into; they are cloned into
/// `subqueries` so the caller can walk them in their own scope.
#[derive(Debug, Default)]
pub(crate) struct ExprCollector {
    depth: usize,
    pub alias_context: bool,
    pub references: Vec<ColumnReference>,
    pub subqueries: Vec<Query>,
}

impl Visitor for ExprCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<Self::Break> {
        if self.depth == 0 {
            self.subqueries.push(query.clone());
        }
        self.depth += 1;
        ControlFlow::Continue(())
    }

    fn post_visit_query(&mut self, _query: &Query) -> ControlFlow<Self::Break> {
        self.depth = self.depth.saturating_sub(1);
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<Self::Break> {
        if self.depth > 0 {
            return ControlFlow::Continue(());
        }
        let idents = match expr {
            Expr::Identifier(ident) => vec![ident.clone()],
            Expr::CompoundIdentifier(idents) => idents.clone(),
            _ => return ControlFlow::Continue(()),
        };
        self.references.push(ColumnReference {
            idents,
            alias_context: self.alias_context,
        });
        ControlFlow::Continue(())
    }
}

/// Collects every table name a statement reads or writes.
#[derive(Debug, Default)]
pub(crate) struct RelationCollector {
    pub names: Vec<ObjectName>,
}

impl Visitor for RelationCollector {
    type Break = ();

    fn pre_visit_relation(&mut self, relation: &ObjectName) -> ControlFlow<Self::Break> {
        self.names.push(relation.clone());
        ControlFlow::Continue(())
    }
}
