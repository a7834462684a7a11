//! Error types for the pdf-fields library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the pdf-fields library
///
/// These abort a flatten. Problems confined to a single field are reported
/// as [`crate::pdf::SkipReason`] instead and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// PDF processing error
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preset or dump (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Source document has no pages
    #[error("PDF has no pages: {0}")]
    EmptyPdf(String),

    /// MediaBox present but not four numbers
    #[error("Invalid MediaBox on page {0:?}")]
    InvalidMediaBox(lopdf::ObjectId),

    /// General error
    #[error("{0}")]
    General(String),
}
