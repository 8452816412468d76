use super::translation::TranslationMap;
use super::{CatalogError, NameFilters, PatternFilters, Schema, check_proper_names};
use crate::filter::{self, EmbeddingSpec, FilterCriteria, FilterError, FilterStack};
use crate::layout::{self, LayoutError, LayoutOptions};
use crate::naming::normalize_name;
use serde::Serialize;
use std::collections::BTreeMap;

/// Root of the catalog: an ordered list of schemas plus the schema filters.
#[derive(Debug, Clone, Serialize)]
pub struct Database {
    name: String,
    proper_name: String,
    schemas: Vec<Schema>,
    #[serde(skip)]
    filters: FilterStack,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            proper_name: normalize_name(&name),
            name,
            schemas: Vec::new(),
            filters: FilterStack::new(),
        }
    }

    pub fn with_schemas(
        name: impl Into<String>,
        schemas: Vec<Schema>,
    ) -> Result<Self, CatalogError> {
        let mut database = Self::new(name);
        database.register_schemas(schemas)?;
        Ok(database)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn proper_name(&self) -> &str {
        &self.proper_name
    }

    /// Append a schema, rejecting a proper-name collision with an existing one.
    pub fn register_schema(&mut self, schema: Schema) -> Result<(), CatalogError> {
        check_proper_names(
            "schemas",
            &format!("database '{}'", self.name),
            self.schemas
                .iter()
                .chain(std::iter::once(&schema))
                .map(|s| (s.name(), s.proper_name())),
        )?;
        tracing::debug!(
            database = %self.name,
            schema = %schema.name(),
            tables = schema.all_tables().len(),
            "Registered schema"
        );
        self.schemas.push(schema);
        self.filters.refresh(&self.schemas);
        Ok(())
    }

    pub fn register_schemas(
        &mut self,
        schemas: impl IntoIterator<Item = Schema>,
    ) -> Result<(), CatalogError> {
        for schema in schemas {
            self.register_schema(schema)?;
        }
        Ok(())
    }

    /// Every schema, ignoring filters.
    pub fn all_schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Schemas left visible by the active filters.
    pub fn schemas(&self) -> Vec<&Schema> {
        self.filters.visible(&self.schemas)
    }

    pub fn schema(&self, name: &str) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.name() == name)
    }

    pub fn schema_mut(&mut self, name: &str) -> Option<&mut Schema> {
        self.schemas.iter_mut().find(|s| s.name() == name)
    }

    pub fn filters(&self) -> &FilterStack {
        &self.filters
    }

    pub fn apply_schema_filter(&mut self, criteria: FilterCriteria) -> Result<(), FilterError> {
        self.filters.apply(&self.schemas, criteria)
    }

    pub fn apply_schema_name_filter<I, S>(&mut self, names: I) -> Result<(), FilterError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.apply_schema_filter(FilterCriteria::names(names))
    }

    pub fn apply_schema_regex_filter(&mut self, pattern: &str) -> Result<(), FilterError> {
        self.apply_schema_filter(FilterCriteria::pattern(pattern))
    }

    /// Table name filters keyed by schema name. Unknown schemas are ignored.
    pub fn apply_table_name_filter(&mut self, filters: &NameFilters) -> Result<(), FilterError> {
        for schema in &mut self.schemas {
            if let Some(names) = filters.get(schema.name()) {
                schema.apply_table_name_filter(names.iter().cloned())?;
            }
        }
        Ok(())
    }

    /// Table regex filters keyed by schema name. Unknown schemas are ignored.
    pub fn apply_table_regex_filter(&mut self, filters: &PatternFilters) -> Result<(), FilterError> {
        for pattern in filters.values() {
            filter::validate_pattern(pattern)?;
        }
        for schema in &mut self.schemas {
            if let Some(pattern) = filters.get(schema.name()) {
                schema.apply_table_regex_filter(pattern)?;
            }
        }
        Ok(())
    }

    /// Column name filters keyed by schema, then table.
    pub fn apply_column_name_filter(
        &mut self,
        filters: &BTreeMap<String, NameFilters>,
    ) -> Result<(), FilterError> {
        for schema in &mut self.schemas {
            if let Some(tables) = filters.get(schema.name()) {
                schema.apply_column_name_filter(tables)?;
            }
        }
        Ok(())
    }

    /// Column regex filters keyed by schema, then table.
    pub fn apply_column_regex_filter(
        &mut self,
        filters: &BTreeMap<String, PatternFilters>,
    ) -> Result<(), FilterError> {
        for pattern in filters.values().flat_map(|tables| tables.values()) {
            filter::validate_pattern(pattern)?;
        }
        for schema in &mut self.schemas {
            if let Some(tables) = filters.get(schema.name()) {
                schema.apply_column_regex_filter(tables)?;
            }
        }
        Ok(())
    }

    /// Similarity filter cascaded to every schema, table and column list.
    ///
    /// With `filter_containers` unset only columns are filtered; schemas and
    /// tables stay visible.
    pub fn apply_embedding_filter(
        &mut self,
        spec: EmbeddingSpec,
        filter_containers: bool,
    ) -> Result<(), FilterError> {
        if filter_containers {
            self.filters
                .apply(&self.schemas, FilterCriteria::embedding(spec.clone()))?;
        }
        for schema in &mut self.schemas {
            schema.apply_embedding_filter(&spec, filter_containers)?;
        }
        Ok(())
    }

    /// Release schema filters and every table and column filter below them.
    pub fn release_filters(&mut self) {
        self.filters.release();
        for schema in &mut self.schemas {
            schema.release_filters();
            schema.release_column_filters();
        }
    }

    /// Release the table filters of every schema, keeping schema and column filters.
    pub fn release_table_filters(&mut self) {
        for schema in &mut self.schemas {
            schema.release_filters();
        }
    }

    /// Names of the schemas hidden by the active filters.
    pub fn excluded_schema_names(&self) -> Vec<String> {
        self.filters.excluded_names(&self.schemas)
    }

    /// Fill schema, table and column embeddings from their original names.
    pub fn apply_embedding_model<F>(&mut self, mut embed: F)
    where
        F: FnMut(&str) -> Vec<f32>,
    {
        for schema in &mut self.schemas {
            let embedding = embed(schema.name());
            schema.set_embedding(embedding);
            schema.apply_embedding_model(&mut embed);
        }
    }

    /// Replay the filter stacks of `previous` onto this catalog, matching
    /// schemas, tables and columns by original name.
    pub fn adopt_filters(&mut self, previous: &Database) {
        self.filters = previous.filters.clone();
        self.filters.refresh(&self.schemas);
        for schema in &mut self.schemas {
            if let Some(old) = previous.schema(schema.name()) {
                schema.adopt_filters(old);
            }
        }
    }

    /// Proper-name lookup over the whole catalog, ignoring filters.
    pub fn translation_map(&self) -> TranslationMap {
        let mut map = TranslationMap::new();
        for schema in &self.schemas {
            map.insert_schema(schema.proper_name(), schema.translation());
        }
        map
    }

    /// Render the visible part of the catalog as layout text.
    pub fn render_layout(&self, options: &LayoutOptions) -> String {
        layout::render_database(self, options)
    }

    /// Raw layout of every schema, filters ignored, for a later
    /// [`Database::reload_from_cache`].
    ///
    /// Fails when a name cannot be carried by the layout text.
    pub fn cached_layout(&self) -> Result<String, LayoutError> {
        layout::check_cacheable(&self.schemas)?;
        let mut unfiltered = self.clone();
        unfiltered.release_filters();
        Ok(unfiltered.render_layout(&LayoutOptions::raw()))
    }

    /// Replace every schema with the content of a cached layout.
    ///
    /// Schema filters are kept and recomputed against the new schemas; table
    /// and column filters go away with the entities that held them.
    pub fn reload_from_cache(
        &mut self,
        cached_layout: &str,
        default_schema: Option<&str>,
    ) -> Result<(), LayoutError> {
        let schemas = layout::parse_layout(cached_layout, default_schema)?.into_schemas()?;
        let mut reloaded = Database::new(self.name.clone());
        reloaded.register_schemas(schemas)?;

        tracing::info!(
            database = %self.name,
            schemas = reloaded.schemas.len(),
            "Reloaded catalog from cached layout"
        );

        self.schemas = reloaded.schemas;
        self.filters.refresh(&self.schemas);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Column, Table, TableKind};

    fn table(name: &str) -> Table {
        Table::new(
            name,
            TableKind::Table,
            None,
            vec![Column::new("id", "INTEGER").primary_key(), Column::new("v", "TEXT")],
            vec![],
        )
        .unwrap()
    }

    fn database() -> Database {
        Database::with_schemas(
            "test",
            vec![
                Schema::new("pub", vec![table("a"), table("b")]).unwrap(),
                Schema::new("pubmore", vec![table("a")]).unwrap(),
                Schema::new("archive", vec![table("old")]).unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_schema_collision_rejected() {
        let mut db = database();
        let err = db.register_schema(Schema::new("PUB", vec![]).unwrap()).unwrap_err();
        assert!(matches!(err, CatalogError::ProperNameCollision { kind: "schemas", .. }));
        assert_eq!(db.all_schemas().len(), 3);
    }

    #[test]
    fn test_schema_filters() {
        let mut db = database();
        db.apply_schema_name_filter(["pub"]).unwrap();
        db.apply_schema_regex_filter("arch").unwrap();

        let visible: Vec<&str> = db.schemas().into_iter().map(|s| s.name()).collect();
        assert_eq!(visible, vec!["pubmore"]);
        assert_eq!(db.excluded_schema_names(), vec!["pub", "archive"]);
    }

    #[test]
    fn test_release_table_filters_only() {
        let mut db = database();
        db.apply_schema_name_filter(["archive"]).unwrap();
        db.apply_table_name_filter(&NameFilters::from([("pub".to_string(), vec!["a".to_string()])]))
            .unwrap();
        db.release_table_filters();

        assert_eq!(db.excluded_schema_names(), vec!["archive"]);
        assert!(db.schema("pub").unwrap().excluded_table_names().is_empty());
    }

    #[test]
    fn test_adopt_filters_by_name() {
        let mut old = database();
        old.apply_schema_name_filter(["archive"]).unwrap();
        old.apply_table_name_filter(&NameFilters::from([("pub".to_string(), vec!["b".to_string()])]))
            .unwrap();
        old.apply_column_name_filter(&BTreeMap::from([(
            "pubmore".to_string(),
            NameFilters::from([("a".to_string(), vec!["v".to_string()])]),
        )]))
        .unwrap();

        // The rescan dropped table `a` from `pub` and reordered schemas.
        let mut fresh = Database::with_schemas(
            "test",
            vec![
                Schema::new("archive", vec![table("old")]).unwrap(),
                Schema::new("pubmore", vec![table("a")]).unwrap(),
                Schema::new("pub", vec![table("b"), table("c")]).unwrap(),
            ],
        )
        .unwrap();
        fresh.adopt_filters(&old);

        assert_eq!(fresh.excluded_schema_names(), vec!["archive"]);
        assert_eq!(fresh.schema("pub").unwrap().excluded_table_names(), vec!["b"]);
        let pubmore_a = fresh.schema("pubmore").unwrap().table("a").unwrap();
        assert_eq!(pubmore_a.excluded_column_names(), vec!["v"]);
    }

    #[test]
    fn test_embedding_filter_cascade() {
        let mut db = database();
        db.apply_embedding_model(|name| if name == "v" { vec![0.0] } else { vec![1.0] });
        db.apply_embedding_filter(EmbeddingSpec::new("q", vec![1.0], 0.5), false)
            .unwrap();

        assert!(db.excluded_schema_names().is_empty());
        assert!(db.schema("pub").unwrap().excluded_table_names().is_empty());
        assert_eq!(
            db.schema("pub").unwrap().table("a").unwrap().excluded_column_names(),
            vec!["v"]
        );
    }
}
