use std::collections::HashSet;
use std::sync::Arc;

use super::types::{BatchExtraction, DocumentUpload, ExtractedDocument, ExtractionFailure, TextExtractor};
use super::ExtractionError;
use crate::pipeline::fanout::scatter_gather;

/// Extract a single document on the blocking pool.
pub async fn extract_document(
    extractor: Arc<dyn TextExtractor>,
    upload: DocumentUpload,
) -> Result<ExtractedDocument, ExtractionError> {
    tokio::task::spawn_blocking(move || extractor.extract(&upload))
        .await
        .map_err(|e| ExtractionError::Task(e.to_string()))?
}

/// Extract every upload with at most `concurrency` in flight.
///
/// Failures are recorded per file and never abort the batch. Uploads with
/// identical bytes are all kept but reported in `duplicate_uploads`.
/// Company names are made unique so later stages can key on them.
pub async fn extract_batch(
    extractor: Arc<dyn TextExtractor>,
    uploads: Vec<DocumentUpload>,
    concurrency: usize,
) -> BatchExtraction {
    let filenames: Vec<String> = uploads.iter().map(|u| u.filename.clone()).collect();

    let results = scatter_gather(uploads, concurrency, move |upload: DocumentUpload| {
        extractor.extract(&upload)
    })
    .await;

    let mut batch = BatchExtraction::default();
    for (filename, result) in filenames.into_iter().zip(results) {
        match result {
            Ok(document) => batch.documents.push(document),
            Err(error) => {
                tracing::warn!(filename = %filename, error = %error, "Proposal extraction failed");
                batch.failed_extractions.push(ExtractionFailure { filename, error });
            }
        }
    }

    disambiguate_company_names(&mut batch.documents);
    batch.duplicate_uploads = duplicate_groups(&batch.documents);
    if !batch.duplicate_uploads.is_empty() {
        tracing::warn!(
            groups = batch.duplicate_uploads.len(),
            "Identical proposal files uploaded under different names"
        );
    }

    tracing::info!(
        extracted = batch.documents.len(),
        failed = batch.failed_extractions.len(),
        "Batch extraction finished"
    );
    batch
}

/// Repeated names get ` (2)`, ` (3)`, ... in submission order.
fn disambiguate_company_names(documents: &mut [ExtractedDocument]) {
    let mut taken: HashSet<String> = documents.iter().map(|d| d.company_name.clone()).collect();
    let mut seen: HashSet<String> = HashSet::new();
    for doc in documents.iter_mut() {
        if seen.insert(doc.company_name.clone()) {
            continue;
        }
        let unique = (2..)
            .map(|n| format!("{} ({n})", doc.company_name))
            .find(|candidate| !taken.contains(candidate))
            .unwrap_or_else(|| doc.filename.clone());
        tracing::warn!(
            filename = %doc.filename,
            company = %unique,
            "Company name already used by another proposal, renamed"
        );
        taken.insert(unique.clone());
        seen.insert(unique.clone());
        doc.company_name = unique;
    }
}

/// Filenames sharing a content hash, in first-seen order.
fn duplicate_groups(documents: &[ExtractedDocument]) -> Vec<Vec<String>> {
    let mut groups: Vec<(&str, Vec<String>)> = Vec::new();
    for doc in documents {
        match groups.iter_mut().find(|(hash, _)| *hash == doc.content_hash) {
            Some((_, names)) => names.push(doc.filename.clone()),
            None => groups.push((doc.content_hash.as_str(), vec![doc.filename.clone()])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .map(|(_, names)| names)
        .collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pipeline::extraction::pdf::tests::make_test_pdf;
    use crate::pipeline::extraction::PdfTextExtractor;

    /// Treats the upload bytes as the text; `FAIL` yields no text.
    pub(crate) struct PlainTextExtractor;

    impl TextExtractor for PlainTextExtractor {
        fn extract(&self, upload: &DocumentUpload) -> Result<ExtractedDocument, ExtractionError> {
            let text = String::from_utf8_lossy(&upload.bytes).to_string();
            if text == "FAIL" {
                return Err(ExtractionError::NoText {
                    filename: upload.filename.clone(),
                });
            }
            Ok(ExtractedDocument {
                filename: upload.filename.clone(),
                company_name: upload.company_name(),
                text_length: text.chars().count(),
                arabic_ratio: 0.0,
                quality_score: 0.5,
                content_hash: upload.content_hash(),
                strategy: "plain".into(),
                text,
            })
        }
    }

    #[tokio::test]
    async fn batch_keeps_order_and_records_failures() {
        let uploads = vec![
            DocumentUpload::new("a.pdf", b"alpha".to_vec()),
            DocumentUpload::new("b.pdf", b"FAIL".to_vec()),
            DocumentUpload::new("c.pdf", b"gamma".to_vec()),
        ];
        let batch = extract_batch(Arc::new(PlainTextExtractor), uploads, 3).await;

        let names: Vec<&str> = batch.documents.iter().map(|d| d.company_name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(batch.failed_extractions.len(), 1);
        assert_eq!(batch.failed_extractions[0].filename, "b.pdf");
        assert!(batch.failed_extractions[0].error.contains("b.pdf"));
    }

    #[tokio::test]
    async fn identical_uploads_are_flagged() {
        let uploads = vec![
            DocumentUpload::new("a.pdf", b"same".to_vec()),
            DocumentUpload::new("b.pdf", b"other".to_vec()),
            DocumentUpload::new("c.pdf", b"same".to_vec()),
        ];
        let batch = extract_batch(Arc::new(PlainTextExtractor), uploads, 1).await;
        assert_eq!(batch.documents.len(), 3);
        assert_eq!(batch.duplicate_uploads, vec![vec!["a.pdf".to_string(), "c.pdf".to_string()]]);
    }

    #[tokio::test]
    async fn repeated_company_names_are_made_unique() {
        let uploads = vec![
            DocumentUpload::new("offer.pdf", b"first".to_vec()),
            DocumentUpload::new("bids/offer.pdf", b"second".to_vec()),
            DocumentUpload::new("offer (2).pdf", b"third".to_vec()),
            DocumentUpload::new("Other.pdf", b"fourth".to_vec()),
        ];
        let batch = extract_batch(Arc::new(PlainTextExtractor), uploads, 2).await;
        let names: Vec<&str> = batch.documents.iter().map(|d| d.company_name.as_str()).collect();
        assert_eq!(names, vec!["offer", "offer (3)", "offer (2)", "Other"]);
    }

    #[tokio::test]
    async fn real_pdfs_extract_in_batch() {
        let uploads = vec![
            DocumentUpload::new("Acme.pdf", make_test_pdf("Acme technical offer")),
            DocumentUpload::new("Broken.pdf", b"%PDF-garbage".to_vec()),
        ];
        let batch = extract_batch(Arc::new(PdfTextExtractor), uploads, 3).await;
        assert_eq!(batch.documents.len(), 1);
        assert_eq!(batch.documents[0].company_name, "Acme");
        assert_eq!(batch.failed_extractions[0].filename, "Broken.pdf");
    }

    #[tokio::test]
    async fn single_document_extraction() {
        let upload = DocumentUpload::new("terms.pdf", b"criteria text".to_vec());
        let doc = extract_document(Arc::new(PlainTextExtractor), upload).await.unwrap();
        assert_eq!(doc.text, "criteria text");
    }
}
