//! `schemabridge translate` command implementation.
//!
//! SQL comes from the positional argument, `--file`, or stdin, in that
//! order. Unresolved identifiers are logged and left in place.

use anyhow::{Context, Result};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

pub fn run(config_path: &Path, sql: Option<String>, file: Option<PathBuf>, json: bool) -> Result<()> {
    let sql = read_sql(sql, file)?;
    if sql.trim().is_empty() {
        anyhow::bail!("No SQL to translate");
    }

    let session = super::open_session(config_path)?;
    let result = session.translate(&sql).context("Translation failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", result.translated_sql);
    }
    Ok(())
}

fn read_sql(sql: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(sql) = sql {
        return Ok(sql);
    }
    if let Some(path) = file {
        return fs::read_to_string(&path)
            .with_context(|| format!("Failed to read SQL from {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read SQL from stdin")?;
    Ok(buffer)
}
