use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::ExtractionError;

/// An uploaded document as received from the caller.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl DocumentUpload {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }

    /// Case-insensitive `.pdf` extension check.
    pub fn is_pdf(&self) -> bool {
        has_pdf_extension(&self.filename)
    }

    /// Company name derived from the filename: path and extension removed.
    pub fn company_name(&self) -> String {
        company_name_from_filename(&self.filename)
    }

    /// Lowercase hex SHA-256 of the raw bytes.
    pub fn content_hash(&self) -> String {
        format!("{:x}", Sha256::digest(&self.bytes))
    }
}

pub fn has_pdf_extension(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}

pub fn company_name_from_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    match base.rfind('.') {
        Some(dot) if dot > 0 => base[..dot].to_string(),
        _ => base.to_string(),
    }
}

/// Text and quality metadata for one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub company_name: String,
    pub text: String,
    pub text_length: usize,
    /// Arabic-block letters over all alphabetic characters.
    pub arabic_ratio: f64,
    /// Informational 0–1 score; never gates the pipeline.
    pub quality_score: f64,
    pub content_hash: String,
    /// Which extraction pass produced the text.
    pub strategy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionFailure {
    pub filename: String,
    pub error: String,
}

/// Gathered result of a batch extraction, in submission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchExtraction {
    pub documents: Vec<ExtractedDocument>,
    pub failed_extractions: Vec<ExtractionFailure>,
    /// Groups of filenames whose bytes are identical.
    pub duplicate_uploads: Vec<Vec<String>>,
}

/// Turns an uploaded document into cleaned text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, upload: &DocumentUpload) -> Result<ExtractedDocument, ExtractionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_extension_is_case_insensitive() {
        assert!(has_pdf_extension("terms.pdf"));
        assert!(has_pdf_extension("TERMS.PDF"));
        assert!(has_pdf_extension("Offer.Pdf"));
        assert!(!has_pdf_extension("terms.docx"));
        assert!(!has_pdf_extension("pdf"));
    }

    #[test]
    fn company_name_strips_extension_and_path() {
        assert_eq!(company_name_from_filename("شركة النور.pdf"), "شركة النور");
        assert_eq!(company_name_from_filename("uploads/acme.v2.pdf"), "acme.v2");
        assert_eq!(company_name_from_filename("C:\\bids\\Beta.PDF"), "Beta");
        assert_eq!(company_name_from_filename(".hidden"), ".hidden");
    }

    #[test]
    fn content_hash_is_stable_hex() {
        let a = DocumentUpload::new("a.pdf", b"same".to_vec());
        let b = DocumentUpload::new("b.pdf", b"same".to_vec());
        assert_eq!(a.content_hash(), b.content_hash());
        assert_eq!(a.content_hash().len(), 64);
        assert!(a.content_hash().chars().all(|c| c.is_ascii_hexdigit()));
    }
}
