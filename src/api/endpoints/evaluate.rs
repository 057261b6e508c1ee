//! `POST /api/evaluate`: run one tender evaluation from a multipart upload.
//!
//! Fields: `terms` (one PDF), `proposals` (one PDF per bidder, repeated),
//! `top_n` (optional, defaults to [`DEFAULT_TOP_N`]).

use axum::extract::multipart::Field;
use axum::extract::{Multipart, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AppState, DEFAULT_TOP_N};
use crate::pipeline::extraction::DocumentUpload;
use crate::pipeline::orchestrator::WorkflowResult;

#[derive(Debug, Default)]
struct EvaluateForm {
    terms: Option<DocumentUpload>,
    proposals: Vec<DocumentUpload>,
    top_n: Option<usize>,
}

pub async fn evaluate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<WorkflowResult>, ApiError> {
    let form = read_form(multipart).await?;
    let terms = form
        .terms
        .ok_or_else(|| ApiError::BadRequest("Missing 'terms' document".into()))?;
    let top_n = form.top_n.unwrap_or(DEFAULT_TOP_N);

    tracing::info!(
        terms_file = %terms.filename,
        proposals = form.proposals.len(),
        top_n,
        "Evaluation request received"
    );

    let result = state
        .evaluator
        .evaluate_tender(terms, form.proposals, top_n)
        .await?;
    Ok(Json(result))
}

async fn read_form(mut multipart: Multipart) -> Result<EvaluateForm, ApiError> {
    let mut form = EvaluateForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "terms" => {
                if form.terms.is_some() {
                    return Err(ApiError::BadRequest("Only one 'terms' document is allowed".into()));
                }
                let filename = uploaded_filename(&field, "terms")?;
                let bytes = field.bytes().await?;
                form.terms = Some(DocumentUpload::new(filename, bytes.to_vec()));
            }
            "proposals" | "proposals[]" => {
                let filename = uploaded_filename(&field, "proposals")?;
                let bytes = field.bytes().await?;
                form.proposals.push(DocumentUpload::new(filename, bytes.to_vec()));
            }
            "top_n" => {
                let raw = field.text().await?;
                let parsed = raw
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ApiError::BadRequest(format!("top_n must be a positive integer, got '{}'", raw.trim())))?;
                form.top_n = Some(parsed);
            }
            other => {
                tracing::debug!(field = other, "Ignoring unknown multipart field");
            }
        }
    }

    Ok(form)
}

/// File parts must carry their own filename; its extension is what input
/// validation checks.
fn uploaded_filename(field: &Field<'_>, name: &str) -> Result<String, ApiError> {
    field
        .file_name()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest(format!("Part '{name}' must be a file upload with a filename")))
}
