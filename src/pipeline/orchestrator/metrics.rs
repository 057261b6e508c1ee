use std::collections::BTreeMap;

use serde::Serialize;

use super::types::Stage;
use crate::pipeline::text::round_to;

/// Stages failing more often than this mark the service degraded.
pub const STAGE_ERROR_RATE_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StageCounters {
    pub tasks_processed: u64,
    pub tasks_failed: u64,
    pub total_processing_time: f64,
}

impl StageCounters {
    pub fn error_rate(&self) -> f64 {
        if self.tasks_processed == 0 {
            0.0
        } else {
            self.tasks_failed as f64 / self.tasks_processed as f64
        }
    }
}

/// Running totals kept by the evaluator.
#[derive(Debug, Clone, Default)]
pub struct PipelineMetrics {
    pub total_workflows: u64,
    pub successful_workflows: u64,
    pub failed_workflows: u64,
    pub fallback_workflows: u64,
    pub total_processing_time: f64,
    pub stages: BTreeMap<Stage, StageCounters>,
}

impl PipelineMetrics {
    pub fn record_stage(&mut self, stage: Stage, seconds: f64, failed: bool) {
        let counters = self.stages.entry(stage).or_default();
        counters.tasks_processed += 1;
        counters.total_processing_time += seconds;
        if failed {
            counters.tasks_failed += 1;
        }
    }

    pub fn record_workflow(&mut self, seconds: f64, succeeded: bool, fallback_used: bool) {
        self.total_workflows += 1;
        self.total_processing_time += seconds;
        if succeeded {
            self.successful_workflows += 1;
        } else {
            self.failed_workflows += 1;
        }
        if fallback_used {
            self.fallback_workflows += 1;
        }
    }

    pub fn snapshot(&self, active_workflows: usize, retained_workflows: usize) -> MetricsSnapshot {
        let finished = self.successful_workflows + self.failed_workflows;
        let stages = Stage::ALL
            .iter()
            .map(|stage| {
                let counters = self.stages.get(stage).cloned().unwrap_or_default();
                let snapshot = StageMetricsSnapshot {
                    tasks_processed: counters.tasks_processed,
                    tasks_failed: counters.tasks_failed,
                    error_rate: round_to(counters.error_rate(), 3),
                    average_processing_time: if counters.tasks_processed == 0 {
                        0.0
                    } else {
                        round_to(counters.total_processing_time / counters.tasks_processed as f64, 3)
                    },
                };
                (stage.as_str().to_string(), snapshot)
            })
            .collect();

        MetricsSnapshot {
            total_workflows: self.total_workflows,
            successful_workflows: self.successful_workflows,
            failed_workflows: self.failed_workflows,
            fallback_workflows: self.fallback_workflows,
            success_rate: if finished == 0 {
                0.0
            } else {
                round_to(self.successful_workflows as f64 / finished as f64, 3)
            },
            average_processing_time: if finished == 0 {
                0.0
            } else {
                round_to(self.total_processing_time / finished as f64, 3)
            },
            active_workflows,
            retained_workflows,
            stages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageMetricsSnapshot {
    pub tasks_processed: u64,
    pub tasks_failed: u64,
    pub error_rate: f64,
    pub average_processing_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_workflows: u64,
    pub successful_workflows: u64,
    pub failed_workflows: u64,
    pub fallback_workflows: u64,
    pub success_rate: f64,
    pub average_processing_time: f64,
    pub active_workflows: usize,
    pub retained_workflows: usize,
    pub stages: BTreeMap<String, StageMetricsSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LlmHealth {
    pub model: String,
    pub available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageHealth {
    pub status: HealthStatus,
    pub error_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub llm: LlmHealth,
    pub stages: BTreeMap<String, StageHealth>,
    pub active_workflows: usize,
    pub checked_at: String,
}

impl HealthReport {
    /// Degraded when the LLM is unreachable or any stage fails too often.
    pub fn assemble(llm: LlmHealth, metrics: &PipelineMetrics, active_workflows: usize) -> Self {
        let stages: BTreeMap<String, StageHealth> = Stage::ALL
            .iter()
            .map(|stage| {
                let rate = metrics.stages.get(stage).map(StageCounters::error_rate).unwrap_or(0.0);
                let status = if rate > STAGE_ERROR_RATE_THRESHOLD {
                    HealthStatus::Degraded
                } else {
                    HealthStatus::Healthy
                };
                (
                    stage.as_str().to_string(),
                    StageHealth {
                        status,
                        error_rate: round_to(rate, 3),
                    },
                )
            })
            .collect();

        let degraded = !llm.available || stages.values().any(|s| s.status == HealthStatus::Degraded);
        Self {
            status: if degraded { HealthStatus::Degraded } else { HealthStatus::Healthy },
            llm,
            stages,
            active_workflows,
            checked_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn llm(available: bool) -> LlmHealth {
        LlmHealth {
            model: "test".to_string(),
            available,
            error: None,
        }
    }

    #[test]
    fn snapshot_rates() {
        let mut metrics = PipelineMetrics::default();
        metrics.record_workflow(2.0, true, false);
        metrics.record_workflow(4.0, false, true);
        metrics.record_stage(Stage::Scoring, 0.5, false);
        metrics.record_stage(Stage::Scoring, 1.5, true);

        let snapshot = metrics.snapshot(1, 2);
        assert_eq!(snapshot.success_rate, 0.5);
        assert_eq!(snapshot.average_processing_time, 3.0);
        assert_eq!(snapshot.fallback_workflows, 1);
        assert_eq!(snapshot.stages["scoring"].error_rate, 0.5);
        assert_eq!(snapshot.stages["scoring"].average_processing_time, 1.0);
        assert_eq!(snapshot.stages["pdf_processing"].tasks_processed, 0);
        assert_eq!(snapshot.stages.len(), 5);
    }

    #[test]
    fn health_degrades_on_llm_or_stage_errors() {
        let metrics = PipelineMetrics::default();
        assert_eq!(HealthReport::assemble(llm(true), &metrics, 0).status, HealthStatus::Healthy);
        assert_eq!(HealthReport::assemble(llm(false), &metrics, 0).status, HealthStatus::Degraded);

        let mut failing = PipelineMetrics::default();
        failing.record_stage(Stage::ProposalAnalysis, 1.0, true);
        let report = HealthReport::assemble(llm(true), &failing, 0);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.stages["proposal_analysis"].status, HealthStatus::Degraded);
    }
}
