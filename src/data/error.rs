use std::path::PathBuf;

use thiserror::Error;

/// Why a dataset could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("data file {} contains no rows", .0.display())]
    EmptyData(PathBuf),

    #[error("cannot parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("data file {} is missing required columns: {}", .path.display(), .missing.join(", "))]
    Schema { path: PathBuf, missing: Vec<String> },

    #[error("data file {} has no usable rows: {reason}", .path.display())]
    DataQuality { path: PathBuf, reason: String },

    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a query against a loaded dataset was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("unknown column '{0}'")]
    ColumnNotFound(String),

    #[error("invalid {field}: '{value}' does not occur in the dataset")]
    InvalidFilter { field: &'static str, value: String },

    #[error("missing required parameter '{0}'")]
    MissingParameter(&'static str),
}
