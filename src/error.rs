use thiserror::Error;

/// Convenience result type for pipeline runs.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Convenience result type for ingestion operations.
pub type IngestionResult<T> = Result<T, IngestionError>;

/// Error type returned by pipeline runs.
///
/// Any of these aborts the whole run; no partial results are returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// The operation key resolved to no registered handler.
    #[error("unknown operation '{key}' (shape #{shape_index})")]
    UnknownOperation { key: String, shape_index: usize },

    /// The handler has no geometry routine for the shape's kind.
    #[error("operation '{key}' has no handler for shape kind '{kind}' (shape #{shape_index})")]
    MissingHandler {
        key: String,
        kind: String,
        shape_index: usize,
    },

    /// The operation record is missing parameters or carries operands of the wrong shape.
    #[error("malformed operation '{key}' (shape #{shape_index}): {message}")]
    MalformedOperation {
        key: String,
        shape_index: usize,
        message: String,
    },
}

impl PipelineError {
    /// Attach the operation key and shape index to a handler failure.
    pub fn from_handler(error: HandlerError, key: &str, shape_index: usize) -> Self {
        match error {
            HandlerError::MissingHandler { kind } => Self::MissingHandler {
                key: key.to_string(),
                kind,
                shape_index,
            },
            HandlerError::Malformed { message } => Self::MalformedOperation {
                key: key.to_string(),
                shape_index,
                message,
            },
        }
    }

    /// Index of the shape being evaluated when the run failed.
    pub fn shape_index(&self) -> usize {
        match self {
            Self::UnknownOperation { shape_index, .. }
            | Self::MissingHandler { shape_index, .. }
            | Self::MalformedOperation { shape_index, .. } => *shape_index,
        }
    }
}

/// Failure reported by an individual operation handler.
///
/// Handlers don't know where in the run they are; the evaluator converts these into
/// [`PipelineError`] with the operation key and shape index attached.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HandlerError {
    /// No geometry routine exists for this shape kind.
    #[error("no handler for shape kind '{kind}'")]
    MissingHandler { kind: String },

    #[error("{message}")]
    Malformed { message: String },
}

impl HandlerError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Error type returned by ingestion functions.
///
/// A single error enum shared by JSON and CSV ingestion of shapes and operations.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Underlying I/O error (e.g. file not found, permission denied).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV ingestion error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error (export only; malformed input is reported as `SchemaMismatch`).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The input does not have the expected record layout (missing keys/columns, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A field could not be converted to the type it requires.
    #[error("failed to parse value at record {record} field '{field}': {message} (raw='{raw}')")]
    ParseError {
        record: usize,
        field: String,
        raw: String,
        message: String,
    },
}
