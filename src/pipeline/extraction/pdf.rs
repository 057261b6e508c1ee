use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::content::Content;
use lopdf::{Document, Object, ObjectId};

use super::clean::clean_extracted_text;
use super::quality::{arabic_ratio, text_quality_score};
use super::types::{DocumentUpload, ExtractedDocument, TextExtractor};
use super::ExtractionError;
use crate::pipeline::strategy::{first_success, Strategy, StrategyOutcome};

/// PDF text extractor for digital PDFs with embedded text layers.
///
/// Tries pdf-extract on the whole document, retries it once from a fresh
/// copy of the buffer, then falls back to page-by-page extraction with
/// lopdf. Scanned images have no text layer and end in `NoText`.
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Raw (uncleaned) text plus the name of the pass that produced it.
    pub fn extract_raw(
        &self,
        filename: &str,
        bytes: &[u8],
    ) -> Result<(String, &'static str), ExtractionError> {
        let strategies: [Strategy<[u8], String>; 3] = [
            Strategy::new("primary", |b: &[u8]| non_empty(primary_pass(b))),
            Strategy::new("primary_retry", |b: &[u8]| {
                let fresh = b.to_vec();
                non_empty(primary_pass(&fresh))
            }),
            Strategy::new("page_by_page", |b: &[u8]| non_empty(page_by_page(b))),
        ];

        match first_success(bytes, &strategies) {
            Ok(resolution) => Ok((resolution.value, resolution.strategy)),
            Err(attempts) => {
                tracing::warn!(
                    filename,
                    attempts = %attempts.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "),
                    "All PDF extraction strategies failed"
                );
                Err(ExtractionError::NoText {
                    filename: filename.to_string(),
                })
            }
        }
    }
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, upload: &DocumentUpload) -> Result<ExtractedDocument, ExtractionError> {
        if !upload.is_pdf() {
            return Err(ExtractionError::UnsupportedFormat(upload.filename.clone()));
        }

        let (raw, strategy) = self.extract_raw(&upload.filename, &upload.bytes)?;
        let text = clean_extracted_text(&raw);
        if text.is_empty() {
            return Err(ExtractionError::NoText {
                filename: upload.filename.clone(),
            });
        }

        let document = ExtractedDocument {
            filename: upload.filename.clone(),
            company_name: upload.company_name(),
            text_length: text.chars().count(),
            arabic_ratio: (arabic_ratio(&text) * 1000.0).round() / 1000.0,
            quality_score: text_quality_score(&text),
            content_hash: upload.content_hash(),
            strategy: strategy.to_string(),
            text,
        };

        tracing::debug!(
            filename = %document.filename,
            strategy,
            chars = document.text_length,
            quality = document.quality_score,
            "Extracted PDF text"
        );
        Ok(document)
    }
}

fn non_empty(result: Result<String, ExtractionError>) -> StrategyOutcome<String> {
    StrategyOutcome::from_result(result.map(|t| (!t.trim().is_empty()).then_some(t)))
}

// ═══════════════════════════════════════════════════════════
// Primary pass
// ═══════════════════════════════════════════════════════════

fn primary_pass(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed font tables.
    match catch_unwind(|| pdf_extract::extract_text_from_mem(bytes)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(ExtractionError::PdfParsing(e.to_string())),
        Err(_) => Err(ExtractionError::PdfParsing("pdf-extract panicked".into())),
    }
}

// ═══════════════════════════════════════════════════════════
// Page-by-page pass
// ═══════════════════════════════════════════════════════════

/// One per-page extraction mode, tried in declaration order.
type PageMode = fn(&Document, u32, ObjectId) -> Option<String>;

const PAGE_MODES: [(&str, PageMode); 4] = [
    ("default", page_default_text),
    ("raw", page_raw_operands),
    ("spans", page_span_text),
    ("walker", page_raw_walker),
];

fn page_by_page(bytes: &[u8]) -> Result<String, ExtractionError> {
    let doc = catch_unwind(AssertUnwindSafe(|| Document::load_mem(bytes)))
        .map_err(|_| ExtractionError::PdfParsing("lopdf panicked while loading".into()))?
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

    let mut pages = Vec::new();
    for (page_number, page_id) in doc.get_pages() {
        let text = PAGE_MODES.iter().find_map(|(mode, run)| {
            let text = catch_unwind(AssertUnwindSafe(|| run(&doc, page_number, page_id))).ok()??;
            let text = text.trim().to_string();
            if text.is_empty() {
                return None;
            }
            tracing::trace!(page = page_number, mode, "Page text recovered");
            Some(text)
        });
        if let Some(text) = text {
            pages.push(text);
        }
    }

    Ok(pages.join(" "))
}

fn page_default_text(doc: &Document, page_number: u32, _page_id: ObjectId) -> Option<String> {
    doc.extract_text(&[page_number]).ok()
}

/// Show-text operands (`Tj`, `TJ`, `'`, `"`) from the decoded content stream.
fn page_raw_operands(doc: &Document, _page_number: u32, page_id: ObjectId) -> Option<String> {
    let content = decoded_content(doc, page_id)?;
    let mut parts = Vec::new();
    for op in &content.operations {
        if matches!(op.operator.as_str(), "Tj" | "TJ" | "'" | "\"") {
            for operand in &op.operands {
                collect_strings(operand, &mut parts);
            }
        }
    }
    Some(parts.join(" "))
}

/// Rebuild text objects span by span, starting a new line on vertical moves.
fn page_span_text(doc: &Document, _page_number: u32, page_id: ObjectId) -> Option<String> {
    let content = decoded_content(doc, page_id)?;
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    let flush = |current: &mut String, lines: &mut Vec<String>| {
        let line = current.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
        current.clear();
    };

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" | "ET" | "T*" | "'" | "\"" => flush(&mut current, &mut lines),
            "Td" | "TD" => {
                let ty = op.operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
                if ty.abs() > f32::EPSILON {
                    flush(&mut current, &mut lines);
                } else if !current.is_empty() {
                    current.push(' ');
                }
            }
            "Tm" => flush(&mut current, &mut lines),
            _ => {}
        }
        match op.operator.as_str() {
            "Tj" | "'" | "\"" => {
                if let Some(Object::String(bytes, _)) = op.operands.last() {
                    current.push_str(&decode_pdf_string(bytes));
                }
            }
            "TJ" => {
                if let Some(Object::Array(items)) = op.operands.first() {
                    for item in items {
                        match item {
                            Object::String(bytes, _) => current.push_str(&decode_pdf_string(bytes)),
                            // Large negative kerning is an inter-word gap.
                            other => {
                                if other.as_float().map(|k| k < -200.0).unwrap_or(false) {
                                    current.push(' ');
                                }
                            }
                        }
                    }
                }
            }
            _ => {}
        }
    }
    flush(&mut current, &mut lines);

    Some(lines.join("\n"))
}

/// Literal strings scanned straight from the content bytes, for streams
/// whose operator syntax is too damaged for the content decoder.
fn page_raw_walker(doc: &Document, _page_number: u32, page_id: ObjectId) -> Option<String> {
    let bytes = doc.get_page_content(page_id).ok()?;
    Some(walk_literal_strings(&bytes).join(" "))
}

fn decoded_content(doc: &Document, page_id: ObjectId) -> Option<Content> {
    let bytes = doc.get_page_content(page_id).ok()?;
    Content::decode(&bytes).ok()
}

fn collect_strings(object: &Object, out: &mut Vec<String>) {
    match object {
        Object::String(bytes, _) => out.push(decode_pdf_string(bytes)),
        Object::Array(items) => {
            let joined: String = items
                .iter()
                .filter_map(|o| match o {
                    Object::String(bytes, _) => Some(decode_pdf_string(bytes)),
                    _ => None,
                })
                .collect();
            out.push(joined);
        }
        _ => {}
    }
}

/// UTF-16BE with BOM, else UTF-8, else Latin-1.
fn decode_pdf_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Collect `( ... )` literal strings, honouring nesting and backslash escapes.
fn walk_literal_strings(bytes: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'(' {
            i += 1;
            continue;
        }
        let mut depth = 1;
        let mut buf = Vec::new();
        i += 1;
        while i < bytes.len() && depth > 0 {
            let b = bytes[i];
            match b {
                b'\\' if i + 1 < bytes.len() => {
                    i += 1;
                    buf.push(match bytes[i] {
                        b'n' => b'\n',
                        b'r' => b'\r',
                        b't' => b'\t',
                        other => other,
                    });
                }
                b'(' => {
                    depth += 1;
                    buf.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth > 0 {
                        buf.push(b);
                    }
                }
                _ => buf.push(b),
            }
            i += 1;
        }
        let text = decode_pdf_string(&buf);
        if !text.trim().is_empty() {
            out.push(text);
        }
    }
    out
}
