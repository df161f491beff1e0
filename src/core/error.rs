//! Error types for the cancer-risk pipeline

use crate::core::schema::FieldError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OncoError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Schema mismatch: expected features {expected:?}, got {actual:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    #[error("Empty data: {0}")]
    EmptyData(String),

    #[error("Invalid test ratio: expected a value in (0, 1), got {0}")]
    InvalidRatio(f64),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Corrupt model artifact: {0}")]
    CorruptArtifact(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] FieldError),

    #[error("Invalid label: expected 0 or 1, got {0}")]
    InvalidLabel(f64),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Plot error: {0}")]
    Plot(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl OncoError {
    /// Map an IO error from opening `path`, turning a missing file into `NotFound`.
    pub fn from_open(path: &std::path::Path, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            OncoError::NotFound(path.to_path_buf())
        } else {
            OncoError::IoError(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, OncoError>;
