//! # schemabridge-sql
//!
//! Translates SQL written against a catalog's proper names back to the
//! database's real identifiers.
//!
//! **Written by the model:**
//! ```sql
//! SELECT o.customer_name FROM order_items oi JOIN orders o ON o.id = oi.order_id
//! ```
//!
//! **Sent to the database (PostgreSQL):**
//! ```sql
//! SELECT o."Customer Name" FROM "Order Items" oi JOIN "Orders" o ON o."ID" = oi."Order ID"
//! ```
//!
//! Only identifiers that resolve through the translation map are replaced,
//! in place, so the rest of the statement keeps its exact spelling.

pub mod error;
pub mod parser;
mod rewrite;
pub mod scope;
pub mod translator;

pub use error::TranslateError;
pub use parser::SqlAnalyzer;
pub use scope::CteDependency;
pub use translator::{IdentifierKind, QueryTranslator, RenamedIdentifier, TranslationResult};
