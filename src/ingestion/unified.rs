//! Unified loading entrypoints.
//!
//! [`ingest_shapes_from_path`] and [`ingest_operations_from_path`] pick a reader by file
//! extension (or [`IngestionOptions::format`]) and report outcomes to an optional
//! [`IngestionObserver`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Operation, Shape};

use super::observability::{IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, RecordKind};
use super::{csv, json};

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values (shapes only).
    Csv,
    /// JSON array-of-objects, single object, or NDJSON.
    Json,
}

impl IngestionFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" | "ndjson" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Options controlling unified loading.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, auto-detect format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Load shape records from a file.
///
/// When an observer is configured, this reports `on_success` with the record count, or
/// `on_failure` (plus `on_alert` at or above `options.alert_at_or_above`).
///
/// ```no_run
/// use std::sync::Arc;
///
/// use shape_pipeline::ingestion::{ingest_shapes_from_path, IngestionOptions, StdErrObserver};
///
/// # fn main() -> Result<(), shape_pipeline::IngestionError> {
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver)),
///     ..Default::default()
/// };
/// let shapes = ingest_shapes_from_path("shapes.json", &opts)?;
/// println!("shapes={}", shapes.len());
/// # Ok(())
/// # }
/// ```
pub fn ingest_shapes_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Vec<Shape>> {
    let path = path.as_ref();
    let format = resolve_format(path, options)?;
    let result = match format {
        IngestionFormat::Csv => csv::shapes_from_csv_path(path),
        IngestionFormat::Json => json::shapes_from_json_path(path),
    };
    report(path, format, RecordKind::Shapes, options, result.as_ref().map(Vec::len));
    result
}

/// Load operation records from a file. Only JSON is supported.
pub fn ingest_operations_from_path(
    path: impl AsRef<Path>,
    options: &IngestionOptions,
) -> IngestionResult<Vec<Operation>> {
    let path = path.as_ref();
    let format = resolve_format(path, options)?;
    let result = match format {
        IngestionFormat::Json => json::operations_from_json_path(path),
        IngestionFormat::Csv => Err(IngestionError::SchemaMismatch {
            message: "operations can only be loaded from json".to_string(),
        }),
    };
    report(path, format, RecordKind::Operations, options, result.as_ref().map(Vec::len));
    result
}

fn report(
    path: &Path,
    format: IngestionFormat,
    records: RecordKind,
    options: &IngestionOptions,
    outcome: Result<usize, &IngestionError>,
) {
    let Some(obs) = options.observer.as_ref() else {
        return;
    };
    let ctx = IngestionContext {
        path: path.to_path_buf(),
        format,
        records,
    };
    match outcome {
        Ok(count) => obs.on_success(&ctx, IngestionStats { records: count }),
        Err(e) => {
            let sev = IngestionSeverity::for_error(e);
            obs.on_failure(&ctx, sev, e);
            if sev >= options.alert_at_or_above {
                obs.on_alert(&ctx, sev, e);
            }
        }
    }
}

fn resolve_format(path: &Path, options: &IngestionOptions) -> IngestionResult<IngestionFormat> {
    if let Some(f) = options.format {
        return Ok(f);
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| IngestionError::SchemaMismatch {
            message: format!(
                "cannot infer format: path has no extension ({})",
                path.display()
            ),
        })?;

    IngestionFormat::from_extension(ext).ok_or_else(|| IngestionError::SchemaMismatch {
        message: format!(
            "cannot infer format from extension '{ext}' for path ({})",
            path.display()
        ),
    })
}

/// An owned load request: a shapes file plus an operations file.
///
/// Useful when pipeline inputs are queued before they are read.
#[derive(Clone)]
pub struct PipelineInputs {
    pub shapes_path: PathBuf,
    pub operations_path: PathBuf,
    pub options: IngestionOptions,
}

impl fmt::Debug for PipelineInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineInputs")
            .field("shapes_path", &self.shapes_path)
            .field("operations_path", &self.operations_path)
            .field("options", &self.options)
            .finish()
    }
}

impl PipelineInputs {
    /// Load both files.
    pub fn load(&self) -> IngestionResult<(Vec<Shape>, Vec<Operation>)> {
        let shapes = ingest_shapes_from_path(&self.shapes_path, &self.options)?;
        let operations = ingest_operations_from_path(&self.operations_path, &self.options)?;
        Ok((shapes, operations))
    }
}
