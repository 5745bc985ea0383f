//! Error types for the exam annotator

use thiserror::Error;

/// Result type alias for the exam annotator
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the exam annotator
#[derive(Error, Debug)]
pub enum Error {
    /// Student script PDF not found
    #[error("PDF not found: {path}")]
    PdfNotFound { path: String },

    /// Invalid PDF file
    #[error("Invalid PDF file: {reason}")]
    InvalidPdf { reason: String },

    /// Grades table not found
    #[error("Grades table not found: {path}")]
    RubricNotFound { path: String },

    /// Grades table parsed but contained no rows
    #[error("Grades table is empty: {path}")]
    EmptyRubric { path: String },

    /// Invalid page range
    #[error("Invalid page range: {range}")]
    InvalidPageRange { range: String },

    /// Page out of bounds
    #[error("Page {page} out of bounds (total: {total})")]
    PageOutOfBounds { page: usize, total: usize },

    /// Text or line could not be drawn
    #[error("Draw failed on page {page}: {reason}")]
    Draw { page: usize, reason: String },

    /// Annotated document could not be saved
    #[error("Save failed for {path}: {reason}")]
    Save { path: String, reason: String },

    /// PDFium error
    #[error("PDFium error: {reason}")]
    Pdfium { reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
