use super::translation::TableTranslation;
use super::{CatalogError, Column, ForeignKeyRelation, check_proper_names};
use crate::filter::{EmbeddingSpec, FilterCriteria, FilterError, FilterStack, Filterable};
use crate::naming::normalize_name;
use serde::{Deserialize, Serialize};

/// Whether a relation is a base table or a view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TableKind {
    #[default]
    Table,
    View,
}

/// A table or view with its columns, keys and column filters.
#[derive(Debug, Clone, Serialize)]
pub struct Table {
    name: String,
    proper_name: String,
    kind: TableKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pk_name: Option<String>,
    columns: Vec<Column>,
    foreign_keys: Vec<ForeignKeyRelation>,
    #[serde(skip)]
    embedding: Option<Vec<f32>>,
    #[serde(skip)]
    filters: FilterStack,
}

impl Table {
    /// Build a table, rejecting colliding column proper names, a named
    /// primary key without key columns and foreign keys over unknown columns.
    ///
    /// Every column a foreign key constrains is marked as a foreign key
    /// column, whatever flags it was built with.
    pub fn new(
        name: impl Into<String>,
        kind: TableKind,
        pk_name: Option<String>,
        mut columns: Vec<Column>,
        foreign_keys: Vec<ForeignKeyRelation>,
    ) -> Result<Self, CatalogError> {
        let name = name.into();
        check_proper_names(
            "columns",
            &format!("table '{name}'"),
            columns.iter().map(|c| (c.name(), c.proper_name())),
        )?;

        if let Some(pk_name) = &pk_name
            && !columns.iter().any(Column::is_pk)
        {
            return Err(CatalogError::NamedKeyWithoutColumns {
                table: name,
                pk_name: pk_name.clone(),
            });
        }

        for constrained in foreign_keys.iter().flat_map(ForeignKeyRelation::constrained_columns) {
            let Some(column) = columns.iter_mut().find(|c| c.name() == constrained.as_str()) else {
                return Err(CatalogError::UnknownForeignKeyColumn {
                    table: name,
                    column: constrained.clone(),
                });
            };
            column.mark_fk();
        }

        Ok(Self {
            proper_name: normalize_name(&name),
            name,
            kind,
            pk_name,
            columns,
            foreign_keys,
            embedding: None,
            filters: FilterStack::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proper_name(&self) -> &str {
        &self.proper_name
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn is_view(&self) -> bool {
        self.kind == TableKind::View
    }

    /// Name of the primary key constraint; `None` for an anonymous key.
    pub fn pk_name(&self) -> Option<&str> {
        self.pk_name.as_deref()
    }

    /// Primary key columns in column order.
    pub fn pk(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.is_pk()).collect()
    }

    pub fn has_pk(&self) -> bool {
        self.columns.iter().any(Column::is_pk)
    }

    pub fn foreign_keys(&self) -> &[ForeignKeyRelation] {
        &self.foreign_keys
    }

    /// Every column, ignoring filters.
    pub fn all_columns(&self) -> &[Column] {
        &self.columns
    }

    /// Columns left visible by the active filters.
    pub fn columns(&self) -> Vec<&Column> {
        self.filters.visible(&self.columns)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name() == name)
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Column] {
        &mut self.columns
    }

    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }

    pub fn set_embedding(&mut self, embedding: Vec<f32>) {
        self.embedding = Some(embedding);
    }

    pub fn filters(&self) -> &FilterStack {
        &self.filters
    }

    pub fn apply_column_filter(&mut self, criteria: FilterCriteria) -> Result<(), FilterError> {
        self.filters.apply(&self.columns, criteria)
    }

    pub fn apply_column_name_filter<I, S>(&mut self, names: I) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_column_filter(FilterCriteria::names(names))
    }

    pub fn apply_column_regex_filter(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.apply_column_filter(FilterCriteria::pattern(pattern))
    }

    pub fn apply_embedding_filter(&mut self, spec: EmbeddingSpec) -> Result<(), FilterError> {
        self.apply_column_filter(FilterCriteria::embedding(spec))
    }

    pub fn release_filters(&mut self) {
        self.filters.release();
    }

    /// Names of the columns hidden by the active filters.
    pub fn excluded_column_names(&self) -> Vec<String> {
        self.filters.excluded_names(&self.columns)
    }

    /// Take over another table's column filters and recompute them here.
    pub(crate) fn adopt_filters(&mut self, previous: &Table) {
        self.filters = previous.filters.clone();
        self.filters.refresh(&self.columns);
    }

    /// Translation entry over every column, filtered or not.
    pub fn translation(&self) -> TableTranslation {
        TableTranslation {
            name: self.name.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| (c.proper_name().to_string(), c.name().to_string()))
                .collect(),
        }
    }
}

impl Filterable for Table {
    fn name(&self) -> &str {
        &self.name
    }

    fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_columns() -> Vec<Column> {
        vec![
            Column::new("Col1", "INTEGER").primary_key().foreign_key(),
            Column::new("Col2", "INTEGER"),
            Column::new("Col3", "INTEGER"),
            Column::new("Col4", "INTEGER"),
            Column::new("Test1", "INTEGER"),
            Column::new("Test2", "INTEGER").primary_key().foreign_key(),
        ]
    }

    fn visible_names(table: &Table) -> Vec<&str> {
        table.columns().into_iter().map(|c| c.name()).collect()
    }

    #[test]
    fn test_apply_column_filters() {
        let mut table = Table::new("T1", TableKind::Table, None, sample_columns(), vec![]).unwrap();
        table.apply_column_name_filter(["Col1", "Col2"]).unwrap();
        table.apply_column_regex_filter("Test[0-9]+").unwrap();

        assert_eq!(visible_names(&table), vec!["Col1", "Col3", "Col4", "Test2"]);
        assert_eq!(table.excluded_column_names(), vec!["Col2", "Test1"]);
    }

    #[test]
    fn test_release_column_filters() {
        let mut table = Table::new("T1", TableKind::Table, None, sample_columns(), vec![]).unwrap();
        table.apply_column_name_filter(["Col1", "Col2"]).unwrap();
        table.release_filters();

        assert!(table.excluded_column_names().is_empty());
        assert_eq!(table.columns().len(), 6);
    }

    #[test]
    fn test_foreign_key_columns_marked() {
        let fk = ForeignKeyRelation::new(["Col3"], "pub", "T2", ["id"]).unwrap();
        let mut table =
            Table::new("T1", TableKind::Table, None, sample_columns(), vec![fk]).unwrap();
        assert!(table.all_columns()[2].is_fk());

        // Key columns survive column filters.
        table.apply_column_name_filter(["Col3"]).unwrap();
        assert!(table.excluded_column_names().is_empty());
    }

    #[test]
    fn test_foreign_key_unknown_column_rejected() {
        let fk = ForeignKeyRelation::new(["owner"], "pub", "T2", ["id"]).unwrap();
        let err = Table::new("T1", TableKind::Table, None, sample_columns(), vec![fk]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownForeignKeyColumn {
                table: "T1".to_string(),
                column: "owner".to_string(),
            }
        );
    }

    #[test]
    fn test_column_collision_rejected() {
        let columns = vec![Column::new("Order Id", "INTEGER"), Column::new("order-id", "INTEGER")];
        let err = Table::new("orders", TableKind::Table, None, columns, vec![]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::ProperNameCollision {
                kind: "columns",
                container: "table 'orders'".to_string(),
                first: "Order Id".to_string(),
                second: "order-id".to_string(),
                proper_name: "order_id".to_string(),
            }
        );
    }

    #[test]
    fn test_named_key_requires_columns() {
        let err = Table::new(
            "t",
            TableKind::Table,
            Some("PK_T".to_string()),
            vec![Column::new("a", "INTEGER")],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::NamedKeyWithoutColumns { .. }));
    }

    #[test]
    fn test_composite_pk_in_column_order() {
        let table = Table::new(
            "playlist_tracks",
            TableKind::Table,
            Some("PK_PlaylistTrack".to_string()),
            vec![
                Column::new("playlist_id", "INTEGER").primary_key(),
                Column::new("note", "TEXT"),
                Column::new("track_id", "INTEGER").primary_key(),
            ],
            vec![],
        )
        .unwrap();

        let pk: Vec<&str> = table.pk().into_iter().map(|c| c.name()).collect();
        assert_eq!(pk, vec!["playlist_id", "track_id"]);
        assert!(table.has_pk());
    }

    #[test]
    fn test_translation_ignores_filters() {
        let mut table =
            Table::new("T2.DOT", TableKind::Table, None, sample_columns(), vec![]).unwrap();
        table.apply_column_name_filter(["Col2"]).unwrap();

        let translation = table.translation();
        assert_eq!(translation.name, "T2.DOT");
        assert_eq!(translation.columns.len(), 6);
        assert_eq!(translation.columns["col2"], "Col2");
    }
}
