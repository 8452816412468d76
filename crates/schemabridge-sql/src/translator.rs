//! Proper-name to original-name translation.
//!
//! A model sees the catalog under proper names (`customer_name`,
//! `order_items`) and writes SQL against them. [`QueryTranslator`] resolves
//! every table and column reference in that SQL through the catalog's
//! [`TranslationMap`] and rewrites it to the database's real, quoted
//! identifier (`"Customer Name"`, `"Order Items"`).
//!
//! Resolution is scoped:
//!
//! - a qualifier resolves to the alias or table name of a relation in the
//!   current or an enclosing query level
//! - a bare column resolves to the first relation in scope that has it
//! - CTEs and derived tables pass lookups through to the relations they read,
//!   unless the column is one of their own output aliases
//! - HAVING, DISTINCT ON and ORDER BY names matching a projection alias are
//!   left alone
//! - ORDER BY over a set operation resolves against its leftmost SELECT
//! - UPDATE SET targets and INSERT column lists resolve against the written
//!   table only
//!
//! Anything that cannot be resolved is left exactly as written and reported.

use crate::error::TranslateError;
use crate::parser::{ColumnReference, ExprCollector, RelationCollector, SqlAnalyzer, object_name_idents};
use crate::rewrite::{Edits, SourceText};
use crate::scope::{CteDependency, Lookup, Relation, Scope, Source, VirtualRelation};
use schemabridge_core::{SqlDialect, TranslationMap, normalize_name};
use serde::Serialize;
use sqlparser::ast::{
    Assignment, AssignmentTarget, ConflictTarget, Ident, Insert, JoinConstraint, JoinOperator,
    ObjectName, OnConflictAction, OnInsert, OrderBy, Query, Select, SelectItem,
    SelectItemQualifiedWildcardKind, SetExpr, Statement, TableAlias, TableFactor, TableObject,
    TableWithJoins, Update, UpdateTableFromKind, Visit,
};
use std::rc::Rc;

/// Kind of identifier that was renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Schema,
    Table,
    Column,
}

/// One identifier rewritten to its original name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedIdentifier {
    pub kind: IdentifierKind,
    /// Identifier as written.
    pub from: String,
    /// Original name it was rewritten to, unquoted.
    pub to: String,
}

/// Result of translating a statement.
#[derive(Debug, Clone, Serialize)]
pub struct TranslationResult {
    /// SQL as received.
    pub original_sql: String,
    /// SQL with every resolved identifier replaced.
    pub translated_sql: String,
    /// Identifiers that were rewritten, in statement order.
    pub renamed: Vec<RenamedIdentifier>,
    /// References that could not be resolved and were left as written.
    pub unresolved: Vec<String>,
    /// CTEs and derived tables, innermost first.
    pub ctes: Vec<CteDependency>,
}

impl TranslationResult {
    /// Check if anything was rewritten.
    pub fn was_modified(&self) -> bool {
        self.translated_sql != self.original_sql
    }
}

/// Rewrites SQL written against proper names to original identifiers.
#[derive(Debug, Clone)]
pub struct QueryTranslator {
    map: TranslationMap,
    analyzer: SqlAnalyzer,
    default_schema: Option<String>,
}

impl QueryTranslator {
    /// Create a translator for `dialect` over a catalog's translation map.
    ///
    /// Unqualified tables belong to the dialect's default schema. When the
    /// map lacks it, Oracle falls back to `SYSTEM`; otherwise a map with a
    /// single schema uses that one.
    pub fn new(map: TranslationMap, dialect: SqlDialect) -> Self {
        let default_schema = default_schema_for(&map, dialect);
        Self {
            map,
            analyzer: SqlAnalyzer::new(dialect),
            default_schema,
        }
    }

    /// Override the schema used for unqualified table names.
    pub fn with_default_schema(mut self, schema: impl AsRef<str>) -> Self {
        self.default_schema = Some(normalize_name(schema.as_ref()));
        self
    }

    pub fn dialect(&self) -> SqlDialect {
        self.analyzer.dialect()
    }

    /// Proper name of the schema used for unqualified table names.
    pub fn default_schema(&self) -> Option<&str> {
        self.default_schema.as_deref()
    }

    pub fn translation_map(&self) -> &TranslationMap {
        &self.map
    }

    /// Translate `sql`, returning only the rewritten text.
    pub fn translate(&self, sql: &str) -> Result<String, TranslateError> {
        Ok(self.translate_detailed(sql)?.translated_sql)
    }

    /// Translate `sql` and report what was renamed and what was not resolved.
    pub fn translate_detailed(&self, sql: &str) -> Result<TranslationResult, TranslateError> {
        let statements = self.analyzer.parse(sql)?;
        if statements.is_empty() {
            return Err(TranslateError::EmptyStatement);
        }

        let mut walker = Walker {
            map: &self.map,
            dialect: self.analyzer.dialect(),
            default_schema: self.default_schema.as_deref(),
            source: SourceText::new(sql),
            edits: Edits::default(),
            renamed: Vec::new(),
            unresolved: Vec::new(),
            ctes: Vec::new(),
        };
        for statement in &statements {
            walker.walk_statement(statement);
        }

        for reference in &walker.unresolved {
            tracing::warn!(reference = %reference, "Unresolved identifier left as written");
        }
        tracing::debug!(
            renamed = walker.renamed.len(),
            unresolved = walker.unresolved.len(),
            "Translated SQL"
        );

        Ok(TranslationResult {
            original_sql: sql.to_string(),
            translated_sql: walker.edits.apply(sql),
            renamed: walker.renamed,
            unresolved: walker.unresolved,
            ctes: walker.ctes,
        })
    }
}

fn default_schema_for(map: &TranslationMap, dialect: SqlDialect) -> Option<String> {
    let primary = dialect.default_schema().map(normalize_name);
    if primary.as_deref().is_some_and(|schema| map.contains_schema(schema)) {
        return primary;
    }
    if let Some(fallback) = dialect.fallback_schema() {
        return Some(normalize_name(fallback));
    }
    if map.len() == 1 {
        return map.schema_names().next().map(str::to_string);
    }
    primary
}

/// Walks parsed statements, resolving references and recording edits.
struct Walker<'a> {
    map: &'a TranslationMap,
    dialect: SqlDialect,
    default_schema: Option<&'a str>,
    source: SourceText<'a>,
    edits: Edits,
    renamed: Vec<RenamedIdentifier>,
    unresolved: Vec<String>,
    ctes: Vec<CteDependency>,
}

impl<'a> Walker<'a> {
    fn walk_statement(&mut self, statement: &Statement) {
        match statement {
            Statement::Query(query) => {
                self.walk_query(query, None, &[]);
            }
            Statement::Update(update) => self.walk_update(update),
            other => self.walk_other(other),
        }
    }

    /// Statements other than queries and updates get a single flat scope
    /// over every table they name.
    fn walk_other(&mut self, statement: &Statement) {
        let mut relations = RelationCollector::default();
        let _ = statement.visit(&mut relations);

        let mut scope = Scope::child(None);
        for name in &relations.names {
            let relation = self.table_relation(name, None, &scope);
            scope.relations.push(relation);
        }

        if let Statement::Insert(insert) = statement {
            self.resolve_insert_targets(insert, &scope);
        }

        let mut collector = ExprCollector::default();
        let _ = statement.visit(&mut collector);
        self.resolve_collected(&collector, &scope);
    }

    /// SET targets resolve against the updated table; everything else sees it
    /// and the FROM tables too.
    fn walk_update(&mut self, update: &Update) {
        let root = Scope::default();
        let mut scope = Scope::child(Some(&root));
        let mut join_operators = Vec::new();
        self.add_relations(&update.table, &root, &mut scope, &mut join_operators);
        let written = scope.relations.len();
        if let Some(UpdateTableFromKind::BeforeSet(from) | UpdateTableFromKind::AfterSet(from)) =
            &update.from
        {
            for table in from {
                self.add_relations(table, &root, &mut scope, &mut join_operators);
            }
        }

        for assignment in &update.assignments {
            self.resolve_assignment(assignment, &scope.relations[..written], &scope);
        }

        let mut collector = ExprCollector::default();
        let _ = update.assignments.visit(&mut collector);
        let _ = update.selection.visit(&mut collector);
        let _ = update.returning.visit(&mut collector);
        for operator in join_operators {
            let _ = operator.visit(&mut collector);
        }
        self.resolve_collected(&collector, &scope);
    }

    /// Column list, SET form and ON CONFLICT / ON DUPLICATE KEY targets of an
    /// INSERT, resolved against the table written to.
    fn resolve_insert_targets(&mut self, insert: &Insert, scope: &Scope<'_>) {
        let target = match &insert.table {
            TableObject::TableName(name) => {
                let written = written_name(name);
                scope
                    .relations
                    .iter()
                    .find(|relation| relation.written == written)
            }
            _ => None,
        };
        let target = target.map_or(&[][..], std::slice::from_ref);

        for column in &insert.columns {
            self.resolve_target_column(column, target);
        }
        for assignment in &insert.assignments {
            self.resolve_assignment(assignment, target, scope);
        }
        match &insert.on {
            Some(OnInsert::DuplicateKeyUpdate(assignments)) => {
                for assignment in assignments {
                    self.resolve_assignment(assignment, target, scope);
                }
            }
            Some(OnInsert::OnConflict(conflict)) => {
                if let Some(ConflictTarget::Columns(columns)) = &conflict.conflict_target {
                    for column in columns {
                        self.resolve_target_column(column, target);
                    }
                }
                if let OnConflictAction::DoUpdate(update) = &conflict.action {
                    for assignment in &update.assignments {
                        self.resolve_assignment(assignment, target, scope);
                    }
                }
            }
            _ => {}
        }
    }

    fn resolve_assignment(&mut self, assignment: &Assignment, target: &[Relation], scope: &Scope<'_>) {
        let names = match &assignment.target {
            AssignmentTarget::ColumnName(name) => std::slice::from_ref(name),
            AssignmentTarget::Tuple(names) => names.as_slice(),
        };
        for name in names {
            match object_name_idents(name).as_slice() {
                [column] => self.resolve_target_column(column, target),
                idents => {
                    let reference = ColumnReference {
                        idents: idents.iter().map(|&ident| ident.clone()).collect(),
                        alias_context: false,
                    };
                    self.resolve_reference(&reference, scope);
                }
            }
        }
    }

    /// Rename a column of the table being written, reporting it when the
    /// table lacks it.
    fn resolve_target_column(&mut self, column: &Ident, target: &[Relation]) {
        if !self.resolve_in(column, target) {
            self.unresolved.push(column.value.clone());
        }
    }

    /// Walk a query. `outer_order_by` holds ORDER BY clauses of enclosing
    /// parenthesized queries, which name this query's output columns.
    fn walk_query(
        &mut self,
        query: &Query,
        parent: Option<&Scope<'_>>,
        outer_order_by: &[&OrderBy],
    ) -> VirtualRelation {
        let mut scope = Scope::child(parent);
        if let Some(with) = &query.with {
            for cte in &with.cte_tables {
                let name = normalize_name(&cte.alias.name.value);
                let mut relation = self.walk_query(&cte.query, Some(&scope), &[]);
                relation.dependency.name = name.clone();
                add_alias_columns(&mut relation, &cte.alias);
                self.ctes.push(relation.dependency.clone());
                scope.define_cte(name, Rc::new(relation));
            }
        }
        let mut order_by = outer_order_by.to_vec();
        order_by.extend(query.order_by.as_ref());
        self.walk_set_expr(&query.body, &scope, &order_by)
    }

    fn walk_set_expr(
        &mut self,
        body: &SetExpr,
        scope: &Scope<'_>,
        order_by: &[&OrderBy],
    ) -> VirtualRelation {
        match body {
            SetExpr::Select(select) => self.walk_select(select, scope, order_by),
            SetExpr::Query(query) => self.walk_query(query, Some(scope), order_by),
            // A set operation's output columns are named by its leftmost branch.
            SetExpr::SetOperation { left, right, .. } => {
                let mut relation = self.walk_set_expr(left, scope, order_by);
                relation.merge(self.walk_set_expr(right, scope, &[]));
                relation
            }
            _ => {
                // No SELECT to resolve against: outer names resolve or get reported.
                let mut collector = ExprCollector::default();
                for order_by in order_by {
                    let _ = order_by.visit(&mut collector);
                }
                self.resolve_collected(&collector, scope);
                VirtualRelation::default()
            }
        }
    }

    fn walk_select(
        &mut self,
        select: &Select,
        parent: &Scope<'_>,
        order_by: &[&OrderBy],
    ) -> VirtualRelation {
        let mut scope = Scope::child(Some(parent));
        let mut join_operators = Vec::new();
        for from in &select.from {
            self.add_relations(from, parent, &mut scope, &mut join_operators);
        }
        for item in &select.projection {
            if let SelectItem::ExprWithAlias { alias, .. } = item {
                scope.output_aliases.insert(normalize_name(&alias.value));
            }
        }

        let mut collector = ExprCollector::default();
        let _ = select.projection.visit(&mut collector);
        let _ = select.prewhere.visit(&mut collector);
        let _ = select.selection.visit(&mut collector);
        let _ = select.group_by.visit(&mut collector);
        let _ = select.cluster_by.visit(&mut collector);
        let _ = select.distribute_by.visit(&mut collector);
        let _ = select.named_window.visit(&mut collector);
        let _ = select.qualify.visit(&mut collector);
        for operator in join_operators {
            let _ = operator.visit(&mut collector);
        }
        collector.alias_context = true;
        let _ = select.distinct.visit(&mut collector);
        let _ = select.having.visit(&mut collector);
        let _ = select.sort_by.visit(&mut collector);
        for order_by in order_by {
            let _ = order_by.visit(&mut collector);
        }

        self.resolve_collected(&collector, &scope);
        for item in &select.projection {
            if let SelectItem::QualifiedWildcard(SelectItemQualifiedWildcardKind::ObjectName(name), _) =
                item
            {
                self.resolve_wildcard(name, &scope);
            }
        }

        let qualified: Vec<(String, String)> = collector
            .references
            .iter()
            .filter_map(|reference| match reference.idents.as_slice() {
                [qualifier, column] => Some((
                    normalize_name(&qualifier.value),
                    normalize_name(&column.value),
                )),
                _ => None,
            })
            .collect();
        scope.to_virtual(&qualified)
    }

    fn add_relations<'q>(
        &mut self,
        from: &'q TableWithJoins,
        query_scope: &Scope<'_>,
        scope: &mut Scope<'_>,
        join_operators: &mut Vec<&'q JoinOperator>,
    ) {
        let first = scope.relations.len();
        self.add_factor(&from.relation, query_scope, scope, join_operators);
        for join in &from.joins {
            self.add_factor(&join.relation, query_scope, scope, join_operators);
            // USING names a column of both sides of the join.
            if let Some(JoinConstraint::Using(columns)) = join_constraint(&join.join_operator) {
                for column in columns {
                    self.resolve_using(column, &scope.relations[first..]);
                }
            }
            join_operators.push(&join.join_operator);
        }
    }

    fn resolve_using(&mut self, name: &ObjectName, joined: &[Relation]) {
        match object_name_idents(name).as_slice() {
            [column] => self.resolve_target_column(column, joined),
            _ => self.unresolved.push(name.to_string()),
        }
    }

    fn add_factor<'q>(
        &mut self,
        factor: &'q TableFactor,
        query_scope: &Scope<'_>,
        scope: &mut Scope<'_>,
        join_operators: &mut Vec<&'q JoinOperator>,
    ) {
        match factor {
            TableFactor::Table { name, alias, .. } => {
                let relation = self.table_relation(name, alias.as_ref(), scope);
                scope.relations.push(relation);
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                // A derived table sees the enclosing query's CTEs but not its
                // sibling relations.
                let mut relation = self.walk_query(subquery, Some(query_scope), &[]);
                // Without an alias it cannot be named, so it is not recorded.
                let key = match alias {
                    Some(alias) => {
                        let key = normalize_name(&alias.name.value);
                        relation.dependency.name = key.clone();
                        add_alias_columns(&mut relation, alias);
                        self.ctes.push(relation.dependency.clone());
                        key
                    }
                    None => String::new(),
                };
                scope.relations.push(Relation {
                    written: key.clone(),
                    key,
                    source: Source::Virtual(Rc::new(relation)),
                    qualifier_original: None,
                });
            }
            TableFactor::NestedJoin {
                table_with_joins, ..
            } => self.add_relations(table_with_joins, query_scope, scope, join_operators),
            _ => {}
        }
    }

    /// Resolve a table name to a relation, renaming its identifiers.
    fn table_relation(
        &mut self,
        name: &ObjectName,
        alias: Option<&TableAlias>,
        scope: &Scope<'_>,
    ) -> Relation {
        let idents = object_name_idents(name);
        let written = written_name(name);

        let default_schema = self.default_schema;
        let source = match idents.as_slice() {
            [table] => match scope.cte(&normalize_name(&table.value)) {
                Some(cte) => Source::Virtual(cte),
                None => match default_schema {
                    Some(schema) => self.catalog_table(None, schema, table),
                    None => {
                        self.unresolved.push(table.value.clone());
                        Source::Unknown
                    }
                },
            },
            [.., schema, table] => {
                let schema_key = normalize_name(&schema.value);
                self.catalog_table(Some(*schema), &schema_key, table)
            }
            [] => Source::Unknown,
        };

        let bare = idents
            .last()
            .map(|ident| normalize_name(&ident.value))
            .unwrap_or_default();
        let qualifier_original = match (&source, alias) {
            (Source::Table { schema, table }, None) => {
                self.map.table(schema, table).map(|t| t.name.clone())
            }
            _ => None,
        };
        Relation {
            key: alias.map_or(bare, |alias| normalize_name(&alias.name.value)),
            written,
            source,
            qualifier_original,
        }
    }

    fn catalog_table(&mut self, schema_ident: Option<&Ident>, schema: &str, table: &Ident) -> Source {
        let map = self.map;
        let table_key = normalize_name(&table.value);
        let Some(translation) = map.schema(schema).and_then(|s| s.tables.get(&table_key).map(|t| (s, t)))
        else {
            let written = match schema_ident {
                Some(ident) => format!("{}.{}", ident.value, table.value),
                None => table.value.clone(),
            };
            self.unresolved.push(written);
            return Source::Unknown;
        };
        let (schema_translation, table_translation) = translation;
        if let Some(ident) = schema_ident {
            self.rename(ident, &schema_translation.name, IdentifierKind::Schema);
        }
        self.rename(table, &table_translation.name, IdentifierKind::Table);
        Source::Table {
            schema: schema.to_string(),
            table: table_key,
        }
    }

    fn resolve_collected(&mut self, collector: &ExprCollector, scope: &Scope<'_>) {
        for reference in &collector.references {
            self.resolve_reference(reference, scope);
        }
        for subquery in &collector.subqueries {
            self.walk_query(subquery, Some(scope), &[]);
        }
    }

    /// Rename `column` through the first of `relations` that has it.
    /// Returns false when none does.
    fn resolve_in<'r>(
        &mut self,
        column: &Ident,
        relations: impl IntoIterator<Item = &'r Relation>,
    ) -> bool {
        let map = self.map;
        let key = normalize_name(&column.value);
        for relation in relations {
            match relation.source.column(map, &key) {
                Lookup::Found(original) => {
                    self.rename(column, original, IdentifierKind::Column);
                    return true;
                }
                Lookup::Alias => return true,
                Lookup::Missing => {}
            }
        }
        false
    }

    fn resolve_reference(&mut self, reference: &ColumnReference, scope: &Scope<'_>) {
        match reference.idents.as_slice() {
            [column] => self.resolve_bare(column, reference.alias_context, scope),
            [qualifier, column] => self.resolve_qualified(qualifier, column, scope),
            [.., schema, table, column] => self.resolve_full(schema, table, column),
            [] => {}
        }
    }

    fn resolve_bare(&mut self, column: &Ident, alias_context: bool, scope: &Scope<'_>) {
        let key = normalize_name(&column.value);
        if alias_context && scope.output_aliases.contains(&key) {
            return;
        }
        if !self.resolve_in(column, scope.visible_relations())
            && !scope.output_aliases.contains(&key)
        {
            self.unresolved.push(column.value.clone());
        }
    }

    /// Rename the qualifier of `qualifier.*` or `schema.table.*`.
    fn resolve_wildcard(&mut self, name: &ObjectName, scope: &Scope<'_>) {
        match object_name_idents(name).as_slice() {
            [qualifier] => match scope.relation(&normalize_name(&qualifier.value)) {
                Some(relation) => {
                    if let Some(original) = &relation.qualifier_original {
                        self.rename(qualifier, original, IdentifierKind::Table);
                    }
                }
                None => self.unresolved.push(format!("{}.*", qualifier.value)),
            },
            [.., schema, table] => {
                let map = self.map;
                let found = map.schema(&normalize_name(&schema.value)).and_then(|s| {
                    let t = s.tables.get(&normalize_name(&table.value))?;
                    Some((s.name.as_str(), t.name.as_str()))
                });
                match found {
                    Some((schema_name, table_name)) => {
                        self.rename(schema, schema_name, IdentifierKind::Schema);
                        self.rename(table, table_name, IdentifierKind::Table);
                    }
                    None => self
                        .unresolved
                        .push(format!("{}.{}.*", schema.value, table.value)),
                }
            }
            [] => {}
        }
    }

    fn resolve_qualified(&mut self, qualifier: &Ident, column: &Ident, scope: &Scope<'_>) {
        let map = self.map;
        let Some(relation) = scope.relation(&normalize_name(&qualifier.value)) else {
            self.unresolved
                .push(format!("{}.{}", qualifier.value, column.value));
            return;
        };
        match relation.source.column(map, &normalize_name(&column.value)) {
            Lookup::Found(original) => self.rename(column, original, IdentifierKind::Column),
            Lookup::Alias => {}
            Lookup::Missing => self
                .unresolved
                .push(format!("{}.{}", qualifier.value, column.value)),
        }
        if let Some(original) = &relation.qualifier_original {
            self.rename(qualifier, original, IdentifierKind::Table);
        }
    }

    fn resolve_full(&mut self, schema: &Ident, table: &Ident, column: &Ident) {
        let map = self.map;
        let schema_key = normalize_name(&schema.value);
        let table_key = normalize_name(&table.value);
        let found = map.schema(&schema_key).and_then(|s| {
            let t = s.tables.get(&table_key)?;
            let c = t.columns.get(&normalize_name(&column.value))?;
            Some((s.name.as_str(), t.name.as_str(), c.as_str()))
        });
        match found {
            Some((schema_name, table_name, column_name)) => {
                self.rename(schema, schema_name, IdentifierKind::Schema);
                self.rename(table, table_name, IdentifierKind::Table);
                self.rename(column, column_name, IdentifierKind::Column);
            }
            None => self.unresolved.push(format!(
                "{}.{}.{}",
                schema.value, table.value, column.value
            )),
        }
    }

    /// Replace `ident` with the quoted original name when they differ.
    fn rename(&mut self, ident: &Ident, original: &str, kind: IdentifierKind) {
        if ident.value == original {
            return;
        }
        let Some(range) = self.source.ident_range(ident) else {
            tracing::warn!(identifier = %ident.value, "Identifier has no usable source span");
            return;
        };
        if self.edits.insert(range, self.dialect.quote_identifier(original)) {
            self.renamed.push(RenamedIdentifier {
                kind,
                from: ident.value.clone(),
                to: original.to_string(),
            });
        }
    }
}

/// Normalized `schema.table` as written.
fn written_name(name: &ObjectName) -> String {
    object_name_idents(name)
        .iter()
        .map(|ident| normalize_name(&ident.value))
        .collect::<Vec<_>>()
        .join(".")
}

fn join_constraint(operator: &JoinOperator) -> Option<&JoinConstraint> {
    match operator {
        JoinOperator::Join(constraint)
        | JoinOperator::Inner(constraint)
        | JoinOperator::Left(constraint)
        | JoinOperator::LeftOuter(constraint)
        | JoinOperator::Right(constraint)
        | JoinOperator::RightOuter(constraint)
        | JoinOperator::FullOuter(constraint)
        | JoinOperator::CrossJoin(constraint)
        | JoinOperator::Semi(constraint)
        | JoinOperator::LeftSemi(constraint)
        | JoinOperator::RightSemi(constraint)
        | JoinOperator::Anti(constraint)
        | JoinOperator::LeftAnti(constraint)
        | JoinOperator::RightAnti(constraint)
        | JoinOperator::StraightJoin(constraint)
        | JoinOperator::AsOf { constraint, .. } => Some(constraint),
        JoinOperator::CrossApply | JoinOperator::OuterApply => None,
    }
}

fn add_alias_columns(relation: &mut VirtualRelation, alias: &TableAlias) {
    relation
        .dependency
        .aliases
        .extend(alias.columns.iter().map(|column| normalize_name(&column.name.value)));
}
