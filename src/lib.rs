//! `shape-pipeline` filters and transforms collections of geometric shapes with an ordered list
//! of declarative operations.
//!
//! A pipeline is a list of [`types::Operation`]s. Each one is either a *filter*
//! (`{ property, operator, value }`, e.g. "area greater than 50") or a *transform*
//! (`{ action, ...params }`, e.g. "scale by 2"). For every shape, operations run left to right;
//! the first filter that fails drops the shape. Transforms mutate the shape as they go, so a
//! `scale` before an `area` filter sees the scaled size.
//!
//! Operation keys are resolved through a [`processing::Registry`]. The default registry knows
//! `area`, `circumference`, `scale` and `move`; callers register more without touching the
//! engine.
//!
//! ## Quick example
//!
//! ```rust
//! use shape_pipeline::processing::{process, Registry};
//! use shape_pipeline::types::{Operation, Operator, Shape};
//!
//! let shapes = vec![Shape::circle(5.0), Shape::square(10.0)];
//! let operations = vec![Operation::filter("area", Operator::Gt, 90.0)];
//!
//! // circle area = round(25π) = 79, square area = 100
//! let out = process(&shapes, &operations, &Registry::default()).unwrap();
//! assert_eq!(out, vec![Shape::square(10.0)]);
//! ```
//!
//! ## Loading records from files
//!
//! ```no_run
//! use shape_pipeline::ingestion::{ingest_operations_from_path, ingest_shapes_from_path, IngestionOptions};
//! use shape_pipeline::processing::{process, Registry};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let opts = IngestionOptions::default();
//! let shapes = ingest_shapes_from_path("shapes.json", &opts)?;
//! let operations = ingest_operations_from_path("operations.json", &opts)?;
//! let out = process(&shapes, &operations, &Registry::default())?;
//! println!("kept {} of {}", out.len(), shapes.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`types`]: shapes, values and operations
//! - [`geometry`]: per-kind area/circumference/scale/move routines
//! - [`processing`]: comparator, handler registry and the pipeline evaluator
//! - [`execution`]: chunked parallel evaluation with metrics and observer hooks
//! - [`ingestion`]: JSON/CSV loading with observer hooks
//! - [`error`]: error types

pub mod error;
pub mod execution;
pub mod geometry;
pub mod ingestion;
pub mod processing;
pub mod types;

pub use error::{HandlerError, IngestionError, IngestionResult, PipelineError, PipelineResult};
