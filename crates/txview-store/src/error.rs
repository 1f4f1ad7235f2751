//! Error types for txview-store

use std::io;

use thiserror::Error;
use txview_core::{DeletionError, SourceLoadError};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("Malformed transaction document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed transaction document: {message}")]
    InvalidDocument { message: String },

    #[error("Transaction not found: {id}")]
    NotFound { id: String },

    #[error("Transaction {id} has status '{status}'")]
    NotDeletable { id: String, status: String },
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, source: io::Error) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl From<StoreError> for SourceLoadError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Io { .. } => SourceLoadError::Unavailable { message: error.to_string() },
            _ => SourceLoadError::InvalidData { message: error.to_string() },
        }
    }
}

impl From<StoreError> for DeletionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::NotFound { id } => DeletionError::NotFound { id },
            StoreError::NotDeletable { id, status } => DeletionError::Rejected {
                id,
                reason: format!("status '{}' is not deletable", status),
            },
            other => DeletionError::Failed { message: other.to_string() },
        }
    }
}
