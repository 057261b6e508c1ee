//! Terms text → weighted rubric.
//!
//! Three tiers tried in order: a header/line pattern scan, LLM extraction,
//! and a fixed four-criterion default. Whatever wins is normalized so the
//! weights are integers summing to exactly 100.

pub mod types;
pub mod defaults;
pub mod normalize;
pub mod pattern;
pub mod llm;
pub mod detector;

pub use types::*;
pub use defaults::*;
pub use normalize::*;
pub use pattern::*;
pub use llm::*;
pub use detector::*;
