//! Configuration types for schemabridge.
//!
//! A single YAML file (conventionally `schemabridge.yaml`) describes where the
//! catalog comes from, which dialect its SQL is written in, how the layout is
//! rendered, and which names are filtered out before the layout reaches a
//! model.
//!
//! ```yaml
//! source:
//!   kind: snapshot          # snapshot | layout
//!   path: chinook.json
//!   database: chinook
//! dialect: PostgreSQL
//! layout:
//!   normalized: true
//!   exclude_views: false
//! filters:
//!   schemas:
//!     exclude: [audit]
//!   tables:
//!     public:
//!       pattern: "tmp_"
//!   columns:
//!     public:
//!       customers:
//!         exclude: [fax]
//! scan_enums: true
//! ```

pub mod filters;

use crate::dialect::SqlDialect;
use crate::layout::{LayoutOptions, Naming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub use filters::{ExclusionRule, FilterConfig};

/// Complete schemabridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Project name.
    #[serde(default)]
    pub project: Option<String>,

    /// Where the catalog is loaded from.
    pub source: SourceConfig,

    /// Dialect of the SQL being translated.
    #[serde(default = "default_dialect")]
    pub dialect: SqlDialect,

    /// Schema assumed for unqualified names in cached layouts.
    #[serde(default)]
    pub default_schema: Option<String>,

    /// Layout rendering.
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Names hidden from the rendered layout.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Infer enum value sets from sampled rows while scanning.
    #[serde(default)]
    pub scan_enums: bool,
}

/// Catalog source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind: `snapshot` (JSON snapshot) or `layout` (cached layout text).
    ///
    /// Kept as a string so an unknown kind surfaces when the session is
    /// opened rather than as a YAML error.
    pub kind: String,

    /// Path to the snapshot or layout file.
    pub path: PathBuf,

    /// Database name; defaults to the file stem.
    #[serde(default)]
    pub database: Option<String>,
}

impl SourceConfig {
    /// Configured database name, or the file stem of `path`.
    pub fn database_name(&self) -> String {
        self.database.clone().unwrap_or_else(|| {
            self.path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "database".to_string())
        })
    }
}

/// Layout rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Render proper names instead of original names.
    #[serde(default = "default_true")]
    pub normalized: bool,

    /// Leave views out of the rendered layout.
    #[serde(default)]
    pub exclude_views: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            normalized: true,
            exclude_views: false,
        }
    }
}

impl LayoutConfig {
    pub fn options(&self) -> LayoutOptions {
        LayoutOptions {
            naming: if self.normalized {
                Naming::Normalized
            } else {
                Naming::Raw
            },
            include_schema: true,
            exclude_views: self.exclude_views,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dialect() -> SqlDialect {
    SqlDialect::PostgreSql
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BridgeConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration and resolve `source.path` relative to the
    /// configuration file's directory.
    pub fn load_with_context(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = Self::from_file(path)?;

        let base_dir = path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        if config.source.path.is_relative() {
            config.source.path = base_dir.join(&config.source.path);
        }

        Ok(config)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.kind.trim().is_empty() {
            return Err(ConfigError::Config("source.kind must not be empty".to_string()));
        }
        if self.source.path.as_os_str().is_empty() {
            return Err(ConfigError::Config("source.path must not be empty".to_string()));
        }
        self.filters
            .validate()
            .map_err(|e| ConfigError::Config(format!("filters: {e}")))
    }

    /// Default schema for cached layouts: the configured one, or the dialect's.
    pub fn layout_default_schema(&self) -> Option<&str> {
        self.default_schema
            .as_deref()
            .or_else(|| self.dialect.default_schema())
    }
}
