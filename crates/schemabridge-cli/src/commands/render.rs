//! `schemabridge render` command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Print the prompt layout, or with `cache` the raw unfiltered layout.
pub fn run(config_path: &Path, cache: bool, output: Option<PathBuf>) -> Result<()> {
    let session = super::open_session(config_path)?;
    let layout = if cache {
        session
            .cached_layout()
            .context("Catalog cannot be cached as layout text")?
    } else {
        session.prompt_layout()
    };

    match output {
        Some(path) => {
            fs::write(&path, &layout)
                .with_context(|| format!("Failed to write layout to {}", path.display()))?;
            eprintln!("Wrote layout: {}", path.display());
        }
        None => println!("{layout}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "source:\n  kind: snapshot\n  path: shop.json\n";

    fn write_project(column: &str) -> tempfile::TempDir {
        let snapshot = format!(
            r#"{{"database": "shop", "schemas": [{{"name": "public", "tables": [
                {{"name": "orders", "columns": [
                    {{"name": "id", "type": "INTEGER", "is_pk": true}},
                    {{"name": "{column}", "type": "TEXT"}}
                ]}}
            ]}}]}}"#
        );
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schemabridge.yaml"), CONFIG).unwrap();
        fs::write(dir.path().join("shop.json"), snapshot).unwrap();
        dir
    }

    #[test]
    fn test_cache_written() {
        let dir = write_project("note");
        let output = dir.path().join("shop.sql");
        run(&dir.path().join("schemabridge.yaml"), true, Some(output.clone())).unwrap();

        let layout = fs::read_to_string(&output).unwrap();
        assert!(layout.starts_with("CREATE SCHEMA public;\n\nCREATE TABLE public.orders(\n"));
    }

    /// A cache that would not reload as the same catalog is refused.
    #[test]
    fn test_cache_refused_for_spaced_column() {
        let dir = write_project("customer name");
        let output = dir.path().join("shop.sql");
        let err = run(&dir.path().join("schemabridge.yaml"), true, Some(output.clone())).unwrap_err();

        assert!(format!("{err:#}").contains("column 'customer name' cannot be written"));
        assert!(!output.exists());
    }
}
