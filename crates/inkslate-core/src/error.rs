//! Error types shared across the document model, undo log and configuration.

use thiserror::Error;

/// Document errors.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Lock error: {0}")]
    Lock(String),
    #[error("Page not found: {0}")]
    PageNotFound(usize),
    #[error("Layer not found: {0}")]
    LayerNotFound(usize),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(String),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

