//! HTTP surface for the evaluation pipeline.
//!
//! Routes under `/api/`:
//! - `POST /api/evaluate` runs one evaluation from a multipart upload
//! - `GET /api/workflows`, `GET /api/workflows/:id` report workflow history
//! - `GET /api/metrics`, `POST /api/metrics/reset` expose pipeline counters
//! - `GET /api/health` pings the LLM and rates each stage

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{start_api_server, ApiServer};
