use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::{json, Value};
use tracing::Instrument;

use super::fallback::fallback_envelope;
use super::metrics::{HealthReport, LlmHealth, MetricsSnapshot, PipelineMetrics};
use super::registry::WorkflowRegistry;
use super::types::{
    new_workflow_id, Stage, StageReport, StageStatus, WorkflowMetadata, WorkflowResult, WorkflowStatus,
};
use super::PipelineError;
use crate::config::EVALUATION_PHASES;
use crate::pipeline::analysis::{ProposalAnalysis, ProposalAnalyzer, ProposalInput};
use crate::pipeline::criteria::{CriteriaDetector, Criterion};
use crate::pipeline::extraction::{
    extract_batch, extract_document, has_pdf_extension, DocumentUpload, ExtractedDocument, TextExtractor,
};
use crate::pipeline::llm::LlmClient;
use crate::pipeline::response::ResponseGenerator;
use crate::pipeline::scoring::{analyze_distribution, Ranking, Scorer};
use crate::pipeline::text::round_to;
use crate::pipeline_config::PipelineConfig;

// ---------------------------------------------------------------------------
// Run state
// ---------------------------------------------------------------------------

/// Data kept aside during a run for the whole-run fallback.
#[derive(Debug, Default)]
struct RunState {
    companies: Vec<String>,
}

// ---------------------------------------------------------------------------
// Evaluator
// ---------------------------------------------------------------------------

/// Entry point for tender evaluations.
///
/// Owns the stage components, the workflow registry, and the metrics.
/// Extractor and LLM client are injected so tests can run offline.
pub struct TenderEvaluator {
    extractor: Arc<dyn TextExtractor>,
    llm: Arc<dyn LlmClient>,
    criteria_detector: Arc<CriteriaDetector>,
    analyzer: Arc<ProposalAnalyzer>,
    scorer: Scorer,
    responder: Arc<ResponseGenerator>,
    extraction_concurrency: usize,
    analysis_concurrency: usize,
    registry: Mutex<WorkflowRegistry>,
    metrics: Mutex<PipelineMetrics>,
}

impl TenderEvaluator {
    pub fn new(config: &PipelineConfig, extractor: Arc<dyn TextExtractor>, llm: Arc<dyn LlmClient>) -> Self {
        Self {
            criteria_detector: Arc::new(CriteriaDetector::new(Arc::clone(&llm), config.max_terms_chars)),
            analyzer: Arc::new(ProposalAnalyzer::new(
                Arc::clone(&llm),
                config.max_proposal_chars,
                config.overall_sample_chars,
            )),
            scorer: Scorer::new(config.normalize_scores),
            responder: Arc::new(ResponseGenerator::new(Arc::clone(&llm))),
            extraction_concurrency: config.extraction_concurrency,
            analysis_concurrency: config.analysis_concurrency,
            registry: Mutex::new(WorkflowRegistry::new(config.registry_capacity)),
            metrics: Mutex::new(PipelineMetrics::default()),
            extractor,
            llm,
        }
    }

    /// Evaluate one tender: terms document, proposal documents, and how
    /// many winners to pick.
    ///
    /// Input problems are rejected before anything runs. A run that fails
    /// later is still answered with a fallback envelope (status `Failed`);
    /// only when even that is impossible does this return an error.
    pub async fn evaluate_tender(
        &self,
        terms: DocumentUpload,
        proposals: Vec<DocumentUpload>,
        top_n: usize,
    ) -> Result<WorkflowResult, PipelineError> {
        validate_inputs(&terms, &proposals, top_n)?;

        let workflow_id = new_workflow_id();
        let span = tracing::info_span!("workflow", workflow_id = %workflow_id);
        self.run_workflow(workflow_id, terms, proposals, top_n)
            .instrument(span)
            .await
    }

    async fn run_workflow(
        &self,
        workflow_id: String,
        terms: DocumentUpload,
        proposals: Vec<DocumentUpload>,
        top_n: usize,
    ) -> Result<WorkflowResult, PipelineError> {
        let started = Instant::now();
        let mut workflow = WorkflowResult::running(
            workflow_id.clone(),
            WorkflowMetadata {
                start_time: chrono::Utc::now().to_rfc3339(),
                terms_file: terms.filename.clone(),
                proposal_count: proposals.len(),
                top_n,
            },
        );
        if let Ok(mut registry) = self.registry.lock() {
            registry.start(workflow.clone());
        }
        tracing::info!(proposals = proposals.len(), top_n, "Evaluation started");

        let mut run = RunState::default();
        let outcome = self.run_stages(terms, proposals, top_n, &mut workflow, &mut run).await;
        let elapsed = started.elapsed().as_secs_f64();
        workflow.processing_time = round_to(elapsed, 3);

        let result = match outcome {
            Ok(mut final_result) => {
                final_result["workflow_metadata"] = json!({
                    "workflow_id": workflow_id,
                    "processing_time": workflow.processing_time,
                    "agent_system_used": true,
                    "evaluation_phases": EVALUATION_PHASES,
                });
                workflow.status = WorkflowStatus::Completed;
                workflow.final_result = Some(final_result);
                tracing::info!(seconds = workflow.processing_time, "Evaluation completed");
                self.record_workflow(elapsed, true, false);
                Ok(())
            }
            Err(error) => {
                tracing::error!(error = %error, "Evaluation failed, attempting fallback");
                workflow.status = WorkflowStatus::Failed;
                workflow.error_message = Some(error.to_string());

                match self.fallback_result(&workflow, &run, top_n, &error) {
                    Ok(final_result) => {
                        workflow.final_result = Some(final_result);
                        self.record_workflow(elapsed, false, true);
                        Ok(())
                    }
                    Err(fatal) => {
                        tracing::error!(error = %fatal, "Fallback evaluation failed");
                        self.record_workflow(elapsed, false, false);
                        Err(fatal)
                    }
                }
            }
        };

        if let Ok(mut registry) = self.registry.lock() {
            registry.finish(workflow.clone());
        }
        result.map(|()| workflow)
    }

    async fn run_stages(
        &self,
        terms: DocumentUpload,
        proposals: Vec<DocumentUpload>,
        top_n: usize,
        workflow: &mut WorkflowResult,
        run: &mut RunState,
    ) -> Result<Value, PipelineError> {
        let started = Instant::now();
        let extracted = self.extraction_stage(terms, proposals, run).await;
        let (terms_doc, documents) = self.conclude(workflow, Stage::PdfProcessing, started, extracted)?;

        let started = Instant::now();
        let detected = self.criteria_stage(terms_doc.text).await;
        let criteria = Arc::new(self.conclude(workflow, Stage::CriteriaDetection, started, detected)?);

        let started = Instant::now();
        let analyzed = self.analysis_stage(&documents, Arc::clone(&criteria)).await;
        let analyses = Arc::new(self.conclude(workflow, Stage::ProposalAnalysis, started, analyzed)?);

        let started = Instant::now();
        let scored = self.scoring_stage(&analyses, &criteria, top_n);
        let ranking = self.conclude(workflow, Stage::Scoring, started, scored)?;

        let started = Instant::now();
        let responded = self.response_stage(ranking, analyses, criteria).await;
        self.conclude(workflow, Stage::ResponseGeneration, started, responded)
    }

    // -- stages ------------------------------------------------------------

    async fn extraction_stage(
        &self,
        terms: DocumentUpload,
        proposals: Vec<DocumentUpload>,
        run: &mut RunState,
    ) -> Result<((ExtractedDocument, Vec<ExtractedDocument>), Value), PipelineError> {
        let (terms_result, batch) = tokio::join!(
            extract_document(Arc::clone(&self.extractor), terms),
            extract_batch(Arc::clone(&self.extractor), proposals, self.extraction_concurrency),
        );
        run.companies = batch.documents.iter().map(|d| d.company_name.clone()).collect();

        let terms_doc = terms_result.map_err(PipelineError::TermsExtraction)?;
        if batch.documents.is_empty() {
            return Err(PipelineError::NoProposals {
                failed: batch.failed_extractions.len(),
            });
        }

        let summary = json!({
            "terms_text_length": terms_doc.text_length,
            "terms_strategy": terms_doc.strategy,
            "proposals_extracted": batch.documents.len(),
            "failed_extractions": batch.failed_extractions,
            "duplicate_uploads": batch.duplicate_uploads,
        });
        Ok(((terms_doc, batch.documents), summary))
    }

    async fn criteria_stage(&self, terms_text: String) -> Result<(Vec<Criterion>, Value), PipelineError> {
        let detector = Arc::clone(&self.criteria_detector);
        let detection = tokio::task::spawn_blocking(move || detector.detect(&terms_text))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?;

        let summary = json!({
            "method": detection.method,
            "total_criteria": detection.total_criteria,
            "has_weights": detection.has_weights,
            "skipped": detection.skipped,
            "validation": detection.validation,
        });
        Ok((detection.criteria, summary))
    }

    async fn analysis_stage(
        &self,
        documents: &[ExtractedDocument],
        criteria: Arc<Vec<Criterion>>,
    ) -> Result<(Vec<ProposalAnalysis>, Value), PipelineError> {
        let inputs: Vec<ProposalInput> = documents
            .iter()
            .map(|d| ProposalInput {
                company_name: d.company_name.clone(),
                text: d.text.clone(),
            })
            .collect();

        let batch = Arc::clone(&self.analyzer)
            .analyze_batch(inputs, criteria, self.analysis_concurrency)
            .await;
        if batch.analyses.is_empty() {
            return Err(PipelineError::NoAnalyses);
        }

        let summary = json!({
            "successful_analyses": batch.analyses.len(),
            "failed_analyses": batch.failed_analyses,
        });
        Ok((batch.analyses, summary))
    }

    fn scoring_stage(
        &self,
        analyses: &[ProposalAnalysis],
        criteria: &[Criterion],
        top_n: usize,
    ) -> Result<(Ranking, Value), PipelineError> {
        let outcome = self.scorer.score(analyses, criteria)?;
        let distribution = analyze_distribution(&outcome.company_scores);
        let effective_top_n = top_n.min(analyses.len());
        if effective_top_n < top_n {
            tracing::info!(requested = top_n, effective = effective_top_n, "Clamped top_n to analyzed proposals");
        }

        let ranking = self.scorer.rank(outcome.company_scores, effective_top_n)?;
        let summary = json!({
            "normalization_applied": outcome.normalization_applied,
            "score_statistics": outcome.statistics,
            "ranking_statistics": ranking.statistics,
            "distribution_analysis": distribution,
            "top_n": effective_top_n,
        });
        Ok((ranking, summary))
    }

    async fn response_stage(
        &self,
        ranking: Ranking,
        analyses: Arc<Vec<ProposalAnalysis>>,
        criteria: Arc<Vec<Criterion>>,
    ) -> Result<(Value, Value), PipelineError> {
        let responder = Arc::clone(&self.responder);
        let generated = tokio::task::spawn_blocking(move || responder.generate(&ranking, &analyses, &criteria))
            .await
            .map_err(|e| PipelineError::Task(e.to_string()))?;

        if !generated.validation.is_valid {
            return Err(PipelineError::InvalidEnvelope(generated.validation.issues));
        }

        let summary = json!({
            "total_chosen": generated.envelope.chosen.len(),
            "total_not_chosen": generated.envelope.not_chosen.len(),
        });
        let mut final_result = serde_json::to_value(&generated.envelope)?;
        final_result["validation"] = serde_json::to_value(&generated.validation)?;
        Ok((final_result, summary))
    }

    /// Record a stage's report and metrics, then pass its value through.
    fn conclude<T>(
        &self,
        workflow: &mut WorkflowResult,
        stage: Stage,
        started: Instant,
        result: Result<(T, Value), PipelineError>,
    ) -> Result<T, PipelineError> {
        let seconds = started.elapsed().as_secs_f64();
        let (status, summary, value) = match result {
            Ok((value, summary)) => (StageStatus::Completed, summary, Ok(value)),
            Err(error) => {
                tracing::warn!(stage = %stage, error = %error, "Stage failed");
                (StageStatus::Failed, json!({ "error": error.to_string() }), Err(error))
            }
        };

        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_stage(stage, seconds, status == StageStatus::Failed);
        }
        tracing::info!(stage = %stage, seconds = round_to(seconds, 3), "Stage finished");
        workflow.record_stage(StageReport {
            stage,
            status,
            processing_time: round_to(seconds, 3),
            summary,
        });
        value
    }

    // -- fallback and bookkeeping ------------------------------------------

    fn fallback_result(
        &self,
        workflow: &WorkflowResult,
        run: &RunState,
        top_n: usize,
        error: &PipelineError,
    ) -> Result<Value, PipelineError> {
        let envelope = fallback_envelope(&run.companies, top_n, &mut rand::thread_rng())
            .ok_or_else(|| PipelineError::Fatal(error.to_string()))?;

        let mut final_result =
            serde_json::to_value(&envelope).map_err(|e| PipelineError::Fatal(e.to_string()))?;
        final_result["workflow_metadata"] = json!({
            "workflow_id": workflow.workflow_id,
            "processing_time": workflow.processing_time,
            "agent_system_used": false,
            "fallback_used": true,
            "fallback_reason": error.to_string(),
        });
        tracing::warn!(companies = run.companies.len(), "Returning fallback evaluation");
        Ok(final_result)
    }

    fn record_workflow(&self, seconds: f64, succeeded: bool, fallback_used: bool) {
        if let Ok(mut metrics) = self.metrics.lock() {
            metrics.record_workflow(seconds, succeeded, fallback_used);
        }
    }

    // -- reporting ---------------------------------------------------------

    pub fn workflow_status(&self, workflow_id: &str) -> Option<WorkflowResult> {
        self.registry.lock().ok().and_then(|r| r.get(workflow_id))
    }

    /// Finished workflows, most recent first.
    pub fn recent_workflows(&self, limit: usize) -> Vec<WorkflowResult> {
        self.registry
            .lock()
            .map(|r| r.recent(limit))
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        let (active, retained) = self
            .registry
            .lock()
            .map(|r| (r.active_count(), r.completed_count()))
            .unwrap_or((0, 0));
        self.metrics
            .lock()
            .map(|m| m.snapshot(active, retained))
            .unwrap_or_else(|_| PipelineMetrics::default().snapshot(active, retained))
    }

    pub fn reset_metrics(&self) {
        if let Ok(mut metrics) = self.metrics.lock() {
            *metrics = PipelineMetrics::default();
        }
        tracing::info!("Pipeline metrics reset");
    }

    /// Pings the LLM and rates each stage's recent error rate.
    pub async fn health_check(&self) -> HealthReport {
        let llm = Arc::clone(&self.llm);
        let model = llm.model().to_string();
        let ping = tokio::task::spawn_blocking(move || llm.is_available()).await;

        let llm_health = match ping {
            Ok(Ok(available)) => LlmHealth { model, available, error: None },
            Ok(Err(e)) => LlmHealth { model, available: false, error: Some(e.to_string()) },
            Err(e) => LlmHealth { model, available: false, error: Some(e.to_string()) },
        };

        let active = self.registry.lock().map(|r| r.active_count()).unwrap_or(0);
        self.metrics
            .lock()
            .map(|m| HealthReport::assemble(llm_health.clone(), &m, active))
            .unwrap_or_else(|_| HealthReport::assemble(llm_health, &PipelineMetrics::default(), active))
    }
}

fn validate_inputs(terms: &DocumentUpload, proposals: &[DocumentUpload], top_n: usize) -> Result<(), PipelineError> {
    if !has_pdf_extension(&terms.filename) {
        return Err(PipelineError::Validation(format!(
            "Terms document '{}' must be a PDF",
            terms.filename
        )));
    }
    if proposals.is_empty() {
        return Err(PipelineError::Validation("At least one proposal is required".into()));
    }
    if let Some(bad) = proposals.iter().find(|p| !has_pdf_extension(&p.filename)) {
        return Err(PipelineError::Validation(format!(
            "Proposal '{}' must be a PDF",
            bad.filename
        )));
    }
    if top_n == 0 {
        return Err(PipelineError::Validation("top_n must be at least 1".into()));
    }
    Ok(())
}
