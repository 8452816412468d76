//! DDL-like layout text: the schema description shown to a model and the
//! cache format used to reload a catalog without rescanning.
//!
//! ```text
//! CREATE SCHEMA pub;
//!
//! CREATE TABLE pub.t1(
//! id INTEGER,
//! kind ENUM("a","b"),
//! PRIMARY KEY (id),
//! FOREIGN KEY (kind) REFERENCES pub.kinds(name)
//! )
//! ```
//!
//! Rendering a catalog, parsing the text and rendering the result again
//! reproduces the first rendering byte for byte. Names the grammar cannot
//! carry, such as column names with spaces, are caught by [`check_cacheable`].

mod error;
mod parse;
mod render;

use serde::{Deserialize, Serialize};

pub use error::LayoutError;
pub use parse::{ParsedLayout, ParsedSchema, ParsedTable, parse_layout};
pub use render::{check_cacheable, render_database, render_schema, render_table};

/// Which name variant identifiers are rendered with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Naming {
    /// Original names.
    #[default]
    Raw,
    /// Proper names for every identifier, foreign key references included.
    Normalized,
}

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutOptions {
    pub naming: Naming,
    /// Qualify table names with their schema and emit `CREATE SCHEMA` lines.
    pub include_schema: bool,
    /// Leave views out.
    pub exclude_views: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            naming: Naming::Raw,
            include_schema: true,
            exclude_views: false,
        }
    }
}

impl LayoutOptions {
    pub fn raw() -> Self {
        Self::default()
    }

    pub fn normalized() -> Self {
        Self {
            naming: Naming::Normalized,
            ..Self::default()
        }
    }

    pub fn excluding_views(mut self) -> Self {
        self.exclude_views = true;
        self
    }

    pub fn without_schema(mut self) -> Self {
        self.include_schema = false;
        self
    }
}
