use std::io;

use finals_matrix_to_schedule::MatrixError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviseError {
    #[error("term '{0}' is not present in the matrix catalog")]
    UnknownTerm(String),

    #[error("term code '{0}' does not start with a 4-digit year")]
    InvalidTerm(String),

    #[error("upstream fetch failed: {0}")]
    Upstream(String),

    #[error("extraction engine failed: {0}")]
    Extraction(String),

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("all layout versions failed for term '{0}'")]
    AllLayoutsFailed(String),

    #[error("malformed catalog document: {0}")]
    Catalog(String),

    #[error("malformed source PDF: {0}")]
    MalformedPdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to load PDF: {0}")]
    PdfLoad(#[from] lopdf::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ReviseError {
    /// True when the error means "wrong layout variant, try the next one"
    /// rather than "this document is unrecoverable".
    #[must_use]
    pub fn is_layout_mismatch(&self) -> bool {
        matches!(self, Self::Matrix(error) if error.is_layout_mismatch())
    }
}
