//! Core of schemabridge: the schema catalog, its filters, the layout codec,
//! dialect table and configuration.
//!
//! The catalog exposes a database's structure under normalized ("proper")
//! names; the translation map it produces lets `schemabridge-sql` rewrite SQL
//! written against those names back to the real ones.

pub mod catalog;
pub mod config;
pub mod dialect;
pub mod filter;
pub mod layout;
pub mod naming;

pub use catalog::{
    CatalogError, Column, Database, ENUM_TYPE, ForeignKeyRelation, NameFilters, PatternFilters,
    Schema, SchemaTranslation, Table, TableKind, TableTranslation, TranslationMap,
};
pub use config::{BridgeConfig, ConfigError, ExclusionRule, FilterConfig, LayoutConfig, SourceConfig};
pub use dialect::{SqlDialect, UnknownDialect};
pub use filter::{EmbeddingSpec, FilterCriteria, FilterError, FilterStack, Filterable};
pub use layout::{LayoutError, LayoutOptions, Naming, ParsedLayout, parse_layout};
pub use naming::normalize_name;
