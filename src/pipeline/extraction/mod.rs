//! PDF → cleaned text.
//!
//! ```text
//! DocumentUpload (filename, bytes)
//!   │
//!   ├─ primary pass (pdf-extract)
//!   ├─ retry from a fresh read of the buffer
//!   └─ page-by-page (lopdf): default → raw operands → spans → raw walker
//!   │
//!   ▼
//! clean_extracted_text → quality metadata → ExtractedDocument
//! ```
//!
//! Batch extraction fans proposals out over blocking workers behind a
//! semaphore; a document that yields no text is recorded, not fatal.

pub mod types;
pub mod pdf;
pub mod clean;
pub mod quality;
pub mod batch;

pub use types::*;
pub use pdf::*;
pub use clean::*;
pub use quality::*;
pub use batch::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(
        "No text could be extracted from '{filename}'. The file may be a scanned image, \
         corrupted, or password-protected."
    )]
    NoText { filename: String },

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("Unsupported file '{0}': only .pdf documents are accepted")]
    UnsupportedFormat(String),

    #[error("Extraction task failed: {0}")]
    Task(String),
}
