//! `schemabridge check` command implementation.
//!
//! Validates a configuration and the source it points at:
//! - the configuration file parses and its filter patterns compile
//! - snapshot sources match `schemas/Snapshot.schema.json`
//! - the catalog loads
//! - configured filters name schemas, tables and columns that exist

use anyhow::{Context, Result};
use schemabridge_core::{BridgeConfig, Database, ExclusionRule};
use schemabridge_runtime::{Session, SnapshotError, validate_snapshot};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Severity level for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    /// The configuration works but probably not as intended.
    Warning,
    /// The configuration cannot be used.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARN",
            Severity::Error => "ERROR",
        })
    }
}

/// A single check finding.
#[derive(Debug, Clone)]
pub struct CheckFinding {
    pub severity: Severity,
    /// Check that produced the finding.
    pub category: String,
    pub message: String,
    pub file: Option<PathBuf>,
    /// Location within the file, e.g. `filters.tables.public`.
    pub location: Option<String>,
}

impl CheckFinding {
    fn new(severity: Severity, category: &str, message: impl Into<String>) -> Self {
        Self {
            severity,
            category: category.to_string(),
            message: message.into(),
            file: None,
            location: None,
        }
    }

    fn error(category: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, category, message)
    }

    fn warning(category: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, category, message)
    }

    fn info(category: &str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, category, message)
    }

    fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// Results from running all checks.
#[derive(Debug, Default)]
pub struct CheckResults {
    pub findings: Vec<CheckFinding>,
}

impl CheckResults {
    fn add(&mut self, finding: CheckFinding) {
        self.findings.push(finding);
    }

    fn extend(&mut self, findings: impl IntoIterator<Item = CheckFinding>) {
        self.findings.extend(findings);
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    pub fn print_summary(&self) {
        let mut findings: Vec<&CheckFinding> = self.findings.iter().collect();
        findings.sort_by(|a, b| b.severity.cmp(&a.severity).then(a.category.cmp(&b.category)));

        for finding in &findings {
            print_finding(finding);
        }

        let errors = self.count(Severity::Error);
        let warnings = self.count(Severity::Warning);
        println!();
        println!("{}", "=".repeat(60));
        if errors == 0 && warnings == 0 {
            println!("All checks passed.");
        } else {
            println!("Summary: {errors} error(s), {warnings} warning(s)");
        }
    }
}

fn print_finding(finding: &CheckFinding) {
    let location = match (&finding.file, &finding.location) {
        (Some(f), Some(l)) => format!(" [{}:{}]", f.display(), l),
        (Some(f), None) => format!(" [{}]", f.display()),
        (None, Some(l)) => format!(" [{l}]"),
        (None, None) => String::new(),
    };
    println!(
        "  {:<5} [{}]{}: {}",
        finding.severity, finding.category, location, finding.message
    );
}

/// Run every check without printing.
pub fn run_quiet(config_path: &Path) -> Result<CheckResults> {
    let mut results = CheckResults::default();

    let config = match BridgeConfig::load_with_context(config_path) {
        Ok(config) => config,
        Err(e) => {
            results.add(CheckFinding::error("config", e.to_string()).with_file(config_path));
            return Ok(results);
        }
    };

    let source = &config.source.path;
    if !source.exists() {
        results.add(
            CheckFinding::error("source", "source file does not exist")
                .with_file(source)
                .with_location("source.path"),
        );
        return Ok(results);
    }

    if config.source.kind == "snapshot" {
        let findings = check_snapshot(source)?;
        let invalid = findings.iter().any(|f| f.severity == Severity::Error);
        results.extend(findings);
        if invalid {
            return Ok(results);
        }
    }

    let session = match Session::open(config.clone()) {
        Ok(session) => session,
        Err(e) => {
            results.add(CheckFinding::error("source", e.to_string()).with_file(source));
            return Ok(results);
        }
    };
    let database = session.database();

    results.extend(check_filter_references(&config, database));
    results.extend(check_default_schema(&config, database));
    results.add(catalog_summary(database));
    Ok(results)
}

/// Run every check and print the findings. Fails when any check errors.
pub fn run(config_path: &Path) -> Result<()> {
    println!("Checking {}", config_path.display());
    let results = run_quiet(config_path)?;
    results.print_summary();

    if results.has_errors() {
        anyhow::bail!("Configuration check failed");
    }
    Ok(())
}

fn check_snapshot(path: &Path) -> Result<Vec<CheckFinding>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let value: JsonValue = match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            return Ok(vec![
                CheckFinding::error("snapshot", format!("invalid JSON: {e}")).with_file(path),
            ]);
        }
    };

    match validate_snapshot(&value) {
        Ok(()) => Ok(Vec::new()),
        Err(SnapshotError::Invalid(problems)) => Ok(problems
            .into_iter()
            .map(|problem| {
                let finding = match problem.split_once(": ") {
                    Some((location, message)) => {
                        CheckFinding::error("snapshot", message).with_location(location)
                    }
                    None => CheckFinding::error("snapshot", problem.as_str()),
                };
                finding.with_file(path)
            })
            .collect()),
        Err(e) => Ok(vec![CheckFinding::error("snapshot", e.to_string()).with_file(path)]),
    }
}

/// Filters naming entities the catalog does not have never match.
fn check_filter_references(config: &BridgeConfig, database: &Database) -> Vec<CheckFinding> {
    let filters = &config.filters;
    let mut findings = Vec::new();
    let missing = |location: String, message: String| {
        CheckFinding::warning("filters", message).with_location(location)
    };

    for name in &filters.schemas.exclude {
        if database.schema(name).is_none() {
            findings.push(missing(
                "filters.schemas.exclude".to_string(),
                format!("schema '{name}' does not exist"),
            ));
        }
    }

    for (schema_name, rule) in &filters.tables {
        let location = format!("filters.tables.{schema_name}");
        let Some(schema) = database.schema(schema_name) else {
            findings.push(missing(location, format!("schema '{schema_name}' does not exist")));
            continue;
        };
        for name in unknown_names(rule, |name| schema.table(name).is_some()) {
            findings.push(missing(
                location.clone(),
                format!("table '{schema_name}.{name}' does not exist"),
            ));
        }
    }

    for (schema_name, tables) in &filters.columns {
        let Some(schema) = database.schema(schema_name) else {
            findings.push(missing(
                format!("filters.columns.{schema_name}"),
                format!("schema '{schema_name}' does not exist"),
            ));
            continue;
        };
        findings.extend(check_column_rules(schema_name, schema, tables, &missing));
    }

    findings
}

fn check_column_rules(
    schema_name: &str,
    schema: &schemabridge_core::Schema,
    tables: &BTreeMap<String, ExclusionRule>,
    missing: &impl Fn(String, String) -> CheckFinding,
) -> Vec<CheckFinding> {
    let mut findings = Vec::new();
    for (table_name, rule) in tables {
        let location = format!("filters.columns.{schema_name}.{table_name}");
        let Some(table) = schema.table(table_name) else {
            findings.push(missing(
                location,
                format!("table '{schema_name}.{table_name}' does not exist"),
            ));
            continue;
        };
        for name in unknown_names(rule, |name| table.column(name).is_some()) {
            findings.push(missing(
                location.clone(),
                format!("column '{schema_name}.{table_name}.{name}' does not exist"),
            ));
        }
        for name in &rule.exclude {
            if table.column(name).is_some_and(|c| c.is_key()) {
                findings.push(
                    CheckFinding::info(
                        "filters",
                        format!("key column '{schema_name}.{table_name}.{name}' is never hidden"),
                    )
                    .with_location(format!("filters.columns.{schema_name}.{table_name}")),
                );
            }
        }
    }
    findings
}

fn unknown_names<'a>(
    rule: &'a ExclusionRule,
    exists: impl Fn(&str) -> bool,
) -> impl Iterator<Item = &'a String> {
    rule.exclude.iter().filter(move |name| !exists(name))
}

/// Unqualified table names need a default schema to resolve.
fn check_default_schema(config: &BridgeConfig, database: &Database) -> Vec<CheckFinding> {
    if config.default_schema.is_some() || database.all_schemas().len() <= 1 {
        return Vec::new();
    }
    let has_dialect_default = [config.dialect.default_schema(), config.dialect.fallback_schema()]
        .into_iter()
        .flatten()
        .any(|name| database.schema(name).is_some());
    if has_dialect_default {
        return Vec::new();
    }
    vec![
        CheckFinding::warning(
            "translate",
            format!(
                "no default schema for {} among {} schemas; unqualified table names will not be translated",
                config.dialect,
                database.all_schemas().len()
            ),
        )
        .with_location("default_schema"),
    ]
}

fn catalog_summary(database: &Database) -> CheckFinding {
    let schemas = database.schemas();
    let tables: usize = schemas.iter().map(|s| s.tables().len()).sum();
    CheckFinding::info(
        "catalog",
        format!(
            "{} loaded: {} visible schema(s), {} visible table(s)",
            database.name(),
            schemas.len(),
            tables
        ),
    )
}
