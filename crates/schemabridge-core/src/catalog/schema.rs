use super::translation::SchemaTranslation;
use super::{CatalogError, NameFilters, PatternFilters, Table, check_proper_names};
use crate::filter::{self, EmbeddingSpec, FilterCriteria, FilterError, FilterStack, Filterable};
use crate::naming::normalize_name;
use serde::Serialize;

/// A schema and the table filters stacked on it.
#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    name: String,
    proper_name: String,
    tables: Vec<Table>,
    #[serde(skip)]
    embedding: Option<Vec<f32>>,
    #[serde(skip)]
    filters: FilterStack,
}

impl Schema {
    pub fn new(name: impl Into<String>, tables: Vec<Table>) -> Result<Self, CatalogError> {
        let name = name.into();
        check_proper_names(
            "tables",
            &format!("schema '{name}'"),
            tables.iter().map(|t| (t.name(), t.proper_name())),
        )?;

        Ok(Self {
            proper_name: normalize_name(&name),
            name,
            tables,
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

    /// Every table, ignoring filters.
    pub fn all_tables(&self) -> &[Table] {
        &self.tables
    }

    /// Tables left visible by the active filters.
    pub fn tables(&self) -> Vec<&Table> {
        self.filters.visible(&self.tables)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.name() == name)
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

    pub fn apply_table_filter(&mut self, criteria: FilterCriteria) -> Result<(), FilterError> {
        self.filters.apply(&self.tables, criteria)
    }

    pub fn apply_table_name_filter<I, S>(&mut self, names: I) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_table_filter(FilterCriteria::names(names))
    }

    pub fn apply_table_regex_filter(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.apply_table_filter(FilterCriteria::pattern(pattern))
    }

    /// Column name filters keyed by table name. Unknown tables are ignored.
    pub fn apply_column_name_filter(&mut self, filters: &NameFilters) -> Result<(), FilterError> {
        for table in &mut self.tables {
            if let Some(names) = filters.get(table.name()) {
                table.apply_column_name_filter(names.iter().cloned())?;
            }
        }
        Ok(())
    }

    /// Column regex filters keyed by table name. Unknown tables are ignored.
    pub fn apply_column_regex_filter(
        &mut self,
        filters: &PatternFilters,
    ) -> Result<(), FilterError> {
        for pattern in filters.values() {
            filter::validate_pattern(pattern)?;
        }
        for table in &mut self.tables {
            if let Some(pattern) = filters.get(table.name()) {
                table.apply_column_regex_filter(pattern)?;
            }
        }
        Ok(())
    }

    /// Filter every table's columns by similarity; the tables themselves too
    /// when `filter_tables` is set.
    pub fn apply_embedding_filter(
        &mut self,
        spec: &EmbeddingSpec,
        filter_tables: bool,
    ) -> Result<(), FilterError> {
        if filter_tables {
            self.filters
                .apply(&self.tables, FilterCriteria::embedding(spec.clone()))?;
        }
        for table in &mut self.tables {
            table.apply_embedding_filter(spec.clone())?;
        }
        Ok(())
    }

    pub fn release_filters(&mut self) {
        self.filters.release();
    }

    /// Release the column filters of every table, keeping table filters.
    pub fn release_column_filters(&mut self) {
        for table in &mut self.tables {
            table.release_filters();
        }
    }

    /// Names of the tables hidden by the active filters.
    pub fn excluded_table_names(&self) -> Vec<String> {
        self.filters.excluded_names(&self.tables)
    }

    /// Fill table and column embeddings from their original names.
    pub fn apply_embedding_model<F>(&mut self, embed: &mut F)
    where
        F: FnMut(&str) -> Vec<f32>,
    {
        for table in &mut self.tables {
            let embedding = embed(table.name());
            table.set_embedding(embedding);
            for column in table.columns_mut() {
                let embedding = embed(column.name());
                column.set_embedding(embedding);
            }
        }
    }

    pub(crate) fn adopt_filters(&mut self, previous: &Schema) {
        self.filters = previous.filters.clone();
        self.filters.refresh(&self.tables);
        for table in &mut self.tables {
            if let Some(old) = previous.table(table.name()) {
                table.adopt_filters(old);
            }
        }
    }

    /// Translation entry over every table, filtered or not.
    pub fn translation(&self) -> SchemaTranslation {
        SchemaTranslation {
            name: self.name.clone(),
            tables: self
                .tables
                .iter()
                .map(|t| (t.proper_name().to_string(), t.translation()))
                .collect(),
        }
    }
}

impl Filterable for Schema {
    fn name(&self) -> &str {
        &self.name
    }

    fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref()
    }
}
