/// Application-level constants
pub const APP_NAME: &str = "TenderEvaluator";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default bind address for the HTTP surface.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Phase names reported in `workflow_metadata.evaluation_phases`, in execution order.
pub const EVALUATION_PHASES: [&str; 5] = [
    "PDF Processing",
    "Criteria Detection",
    "Proposal Analysis",
    "Scoring & Ranking",
    "Response Generation",
];

/// Log filter used when `RUST_LOG` is not set.
/// Debug builds are verbose for the crate itself, release builds stay at info.
pub fn default_log_filter() -> &'static str {
    if cfg!(debug_assertions) {
        "tender_evaluator=debug,tower_http=info,warn"
    } else {
        "tender_evaluator=info,warn"
    }
}
