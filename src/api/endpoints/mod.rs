//! API endpoint handlers.
//!
//! Handlers only translate HTTP to `TenderEvaluator` calls; all pipeline
//! logic stays in `crate::pipeline`.

pub mod evaluate;
pub mod health;
pub mod metrics;
pub mod workflows;
