//! Runtime side of schemabridge: scanning a database's structure into a
//! catalog and driving a translation session over it.
//!
//! - [`SchemaScanner`]: the contract a backend implements
//! - [`SnapshotScanner`]: backend over a validated JSON snapshot
//! - [`Session`]: catalog, configured filters, prompt layout and translator

pub mod scanner;
pub mod session;
pub mod snapshot;

pub use scanner::{
    ENUM_FIRST_PASS_ROWS, ENUM_SAMPLE_ROWS, ScanError, ScannedColumn, ScannedTable, SchemaScanner,
    infer_enum_values, scan_database,
};
pub use session::{ExcludedColumns, ExcludedTables, Session, SessionError};
pub use snapshot::{Snapshot, SnapshotError, SnapshotScanner, validate as validate_snapshot};
