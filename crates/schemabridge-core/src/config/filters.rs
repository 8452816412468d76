//! Declarative name filters applied to a freshly loaded catalog.

use crate::catalog::{Database, NameFilters, PatternFilters};
use crate::filter::{self, FilterError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Names and a pattern to hide from one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionRule {
    /// Exact original names to hide.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Regex matched against the start of each name.
    #[serde(default)]
    pub pattern: Option<String>,
}

impl ExclusionRule {
    pub fn is_empty(&self) -> bool {
        self.exclude.is_empty() && self.pattern.is_none()
    }
}

/// Filters for every level of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Schemas hidden from the database.
    #[serde(default)]
    pub schemas: ExclusionRule,

    /// Tables hidden per schema.
    #[serde(default)]
    pub tables: BTreeMap<String, ExclusionRule>,

    /// Columns hidden per schema, then table.
    #[serde(default)]
    pub columns: BTreeMap<String, BTreeMap<String, ExclusionRule>>,
}

impl FilterConfig {
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
            && self.tables.values().all(ExclusionRule::is_empty)
            && self
                .columns
                .values()
                .flat_map(BTreeMap::values)
                .all(ExclusionRule::is_empty)
    }

    /// Check that every pattern compiles.
    pub fn validate(&self) -> Result<(), FilterError> {
        let rules = std::iter::once(&self.schemas)
            .chain(self.tables.values())
            .chain(self.columns.values().flat_map(BTreeMap::values));
        for pattern in rules.filter_map(|rule| rule.pattern.as_deref()) {
            filter::validate_pattern(pattern)?;
        }
        Ok(())
    }

    /// Stack every configured filter onto `database`.
    pub fn apply(&self, database: &mut Database) -> Result<(), FilterError> {
        self.validate()?;

        if !self.schemas.exclude.is_empty() {
            database.apply_schema_name_filter(self.schemas.exclude.iter().cloned())?;
        }
        if let Some(pattern) = &self.schemas.pattern {
            database.apply_schema_regex_filter(pattern)?;
        }

        let (names, patterns) = split_rules(&self.tables);
        if !names.is_empty() {
            database.apply_table_name_filter(&names)?;
        }
        if !patterns.is_empty() {
            database.apply_table_regex_filter(&patterns)?;
        }

        let mut column_names = BTreeMap::new();
        let mut column_patterns = BTreeMap::new();
        for (schema, tables) in &self.columns {
            let (names, patterns) = split_rules(tables);
            if !names.is_empty() {
                column_names.insert(schema.clone(), names);
            }
            if !patterns.is_empty() {
                column_patterns.insert(schema.clone(), patterns);
            }
        }
        if !column_names.is_empty() {
            database.apply_column_name_filter(&column_names)?;
        }
        if !column_patterns.is_empty() {
            database.apply_column_regex_filter(&column_patterns)?;
        }

        tracing::debug!(database = %database.name(), "Applied configured filters");
        Ok(())
    }
}

fn split_rules(rules: &BTreeMap<String, ExclusionRule>) -> (NameFilters, PatternFilters) {
    let names = rules
        .iter()
        .filter(|(_, rule)| !rule.exclude.is_empty())
        .map(|(container, rule)| (container.clone(), rule.exclude.clone()))
        .collect();
    let patterns = rules
        .iter()
        .filter_map(|(container, rule)| {
            rule.pattern
                .as_ref()
                .map(|pattern| (container.clone(), pattern.clone()))
        })
        .collect();
    (names, patterns)
}
