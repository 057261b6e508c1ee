//! Ranking + analyses → validated JSON envelope with Arabic reasons.

pub mod types;
pub mod justify;
pub mod summary;
pub mod validate;
pub mod generator;

pub use types::*;
pub use justify::{clamp_reasons, fallback_reasons, justify, GENERIC_REASON_POOL, MAX_REASONS, MIN_REASONS};
pub use summary::evaluation_summary;
pub use validate::{validate_envelope, validate_value};
pub use generator::ResponseGenerator;
