//! Translation sessions.
//!
//! A [`Session`] owns one catalog loaded from the configured source, keeps
//! the configured filters applied to it, renders the layout handed to a
//! model and translates the SQL the model writes back.

use crate::scanner::{ScanError, SchemaScanner, scan_database};
use crate::snapshot::{SnapshotError, SnapshotScanner};
use schemabridge_core::{
    BridgeConfig, ConfigError, Database, EmbeddingSpec, FilterError, LayoutError, NameFilters,
    PatternFilters,
};
use schemabridge_sql::{QueryTranslator, TranslateError, TranslationResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while opening or using a session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// `source.kind` names no known backend.
    #[error("unknown connection type: {0}")]
    UnknownConnectionType(String),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("invalid cached layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Translate(#[from] TranslateError),
}

/// Tables hidden per visible schema.
pub type ExcludedTables = BTreeMap<String, Vec<String>>;

/// Columns hidden per visible schema, then visible table.
pub type ExcludedColumns = BTreeMap<String, BTreeMap<String, Vec<String>>>;

/// A loaded catalog with its filters and translator.
#[derive(Debug)]
pub struct Session {
    config: BridgeConfig,
    database: Database,
    translator: QueryTranslator,
}

impl Session {
    /// Load the configured source and apply the configured filters.
    pub fn open(config: BridgeConfig) -> Result<Self, SessionError> {
        let mut database = load_database(&config)?;
        config.filters.apply(&mut database)?;
        let translator = build_translator(&config, &database);

        tracing::info!(
            database = %database.name(),
            dialect = %config.dialect,
            schemas = database.schemas().len(),
            "Opened session"
        );
        Ok(Self {
            config,
            database,
            translator,
        })
    }

    /// Open a session from a configuration file.
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, SessionError> {
        Self::open(BridgeConfig::load_with_context(path)?)
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Mutable catalog access for filter operations not wrapped here.
    ///
    /// The translator is built from the unfiltered translation map, so
    /// filtering never needs it rebuilt.
    pub fn database_mut(&mut self) -> &mut Database {
        &mut self.database
    }

    pub fn translator(&self) -> &QueryTranslator {
        &self.translator
    }

    /// Layout text for the model: visible entities, configured naming.
    pub fn prompt_layout(&self) -> String {
        self.database.render_layout(&self.config.layout.options())
    }

    /// Raw layout of the whole catalog, filters ignored, for use as a
    /// `layout` source by a later session.
    ///
    /// Fails with [`LayoutError::Unrepresentable`] when a name would not
    /// survive the round trip, such as a column name containing a space.
    pub fn cached_layout(&self) -> Result<String, SessionError> {
        Ok(self.database.cached_layout()?)
    }

    /// Translate model-authored SQL to the database's identifiers.
    pub fn translate(&self, sql: &str) -> Result<TranslationResult, SessionError> {
        Ok(self.translator.translate_detailed(sql)?)
    }

    /// Reload the source, carrying every active filter over to the new
    /// catalog.
    pub fn reload(&mut self) -> Result<(), SessionError> {
        let mut database = load_database(&self.config)?;
        database.adopt_filters(&self.database);
        self.translator = build_translator(&self.config, &database);
        self.database = database;
        tracing::info!(database = %self.database.name(), "Reloaded session");
        Ok(())
    }

    pub fn apply_schema_name_filter<I, S>(&mut self, names: I) -> Result<Vec<String>, SessionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.database.apply_schema_name_filter(names)?;
        Ok(self.database.excluded_schema_names())
    }

    pub fn apply_schema_regex_filter(&mut self, pattern: &str) -> Result<Vec<String>, SessionError> {
        self.database.apply_schema_regex_filter(pattern)?;
        Ok(self.database.excluded_schema_names())
    }

    pub fn apply_table_name_filter(
        &mut self,
        filters: &NameFilters,
    ) -> Result<ExcludedTables, SessionError> {
        self.database.apply_table_name_filter(filters)?;
        Ok(self.excluded_tables())
    }

    pub fn apply_table_regex_filter(
        &mut self,
        filters: &PatternFilters,
    ) -> Result<ExcludedTables, SessionError> {
        self.database.apply_table_regex_filter(filters)?;
        Ok(self.excluded_tables())
    }

    pub fn apply_column_name_filter(
        &mut self,
        filters: &BTreeMap<String, NameFilters>,
    ) -> Result<ExcludedColumns, SessionError> {
        self.database.apply_column_name_filter(filters)?;
        Ok(self.excluded_columns())
    }

    pub fn apply_column_regex_filter(
        &mut self,
        filters: &BTreeMap<String, PatternFilters>,
    ) -> Result<ExcludedColumns, SessionError> {
        self.database.apply_column_regex_filter(filters)?;
        Ok(self.excluded_columns())
    }

    /// Fill embeddings with `embed`, then hide everything whose similarity
    /// to the question does not exceed `threshold`.
    pub fn apply_question_filter<F>(
        &mut self,
        question: &str,
        threshold: f32,
        filter_containers: bool,
        mut embed: F,
    ) -> Result<ExcludedColumns, SessionError>
    where
        F: FnMut(&str) -> Vec<f32>,
    {
        let question_embedding = embed(question);
        self.database.apply_embedding_model(&mut embed);
        self.database.apply_embedding_filter(
            EmbeddingSpec::new(question, question_embedding, threshold),
            filter_containers,
        )?;
        Ok(self.excluded_columns())
    }

    /// Drop every filter, configured ones included.
    pub fn release_filters(&mut self) {
        self.database.release_filters();
    }

    /// Hidden tables of every visible schema.
    pub fn excluded_tables(&self) -> ExcludedTables {
        self.database
            .schemas()
            .into_iter()
            .map(|schema| (schema.name().to_string(), schema.excluded_table_names()))
            .collect()
    }

    /// Hidden columns of every visible table.
    pub fn excluded_columns(&self) -> ExcludedColumns {
        self.database
            .schemas()
            .into_iter()
            .map(|schema| {
                let tables = schema
                    .tables()
                    .into_iter()
                    .map(|table| (table.name().to_string(), table.excluded_column_names()))
                    .collect();
                (schema.name().to_string(), tables)
            })
            .collect()
    }
}

fn build_translator(config: &BridgeConfig, database: &Database) -> QueryTranslator {
    let translator = QueryTranslator::new(database.translation_map(), config.dialect);
    match &config.default_schema {
        Some(schema) => translator.with_default_schema(schema),
        None => translator,
    }
}

/// Backend for `source.kind`.
fn scanner_for(config: &BridgeConfig) -> Result<Box<dyn SchemaScanner>, SessionError> {
    match config.source.kind.as_str() {
        "snapshot" => {
            let mut scanner = SnapshotScanner::from_file(&config.source.path)?;
            if let Some(name) = &config.source.database {
                scanner = scanner.with_database_name(name);
            }
            Ok(Box::new(scanner))
        }
        other => Err(SessionError::UnknownConnectionType(other.to_string())),
    }
}

fn load_database(config: &BridgeConfig) -> Result<Database, SessionError> {
    if config.source.kind == "layout" {
        let path = &config.source.path;
        let cached = fs::read_to_string(path).map_err(|source| SessionError::Io {
            path: path.clone(),
            source,
        })?;
        let mut database = Database::new(config.source.database_name());
        database.reload_from_cache(&cached, config.layout_default_schema())?;
        return Ok(database);
    }

    let scanner = scanner_for(config)?;
    Ok(scan_database(scanner.as_ref(), config.scan_enums)?)
}
