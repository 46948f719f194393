//! Loading shapes and operations from files.
//!
//! The evaluator itself only sees in-memory records; this module is the data source in front of
//! it. Most callers should use [`ingest_shapes_from_path`] / [`ingest_operations_from_path`]
//! (from [`unified`]) which:
//!
//! - auto-detect format by file extension (or you can override via [`IngestionOptions`])
//! - optionally report success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]

pub mod csv;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    RecordKind, StdErrObserver,
};
pub use unified::{ingest_operations_from_path, ingest_shapes_from_path, IngestionFormat, IngestionOptions, PipelineInputs};
