//! CLI command implementations for schemabridge.

pub mod check;
pub mod inspect;
pub mod render;
pub mod translate;

use anyhow::{Context, Result};
use schemabridge_runtime::Session;
use std::path::Path;

/// Open a session from the configuration file, with its source resolved
/// relative to the file.
pub(crate) fn open_session(config_path: &Path) -> Result<Session> {
    tracing::debug!(config = %config_path.display(), "Opening session");
    Session::from_config_file(config_path)
        .with_context(|| format!("Failed to open session from {}", config_path.display()))
}
