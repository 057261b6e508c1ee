pub mod llm;
pub mod strategy;
pub mod fanout;
pub mod text;
pub mod extraction; // Stage 1: PDF text extraction
pub mod criteria; // Stage 2: rubric detection
pub mod analysis; // Stage 3: per-proposal analysis
pub mod scoring; // Stage 4: weighted totals and ranking
pub mod response; // Stage 5: justified envelope
pub mod orchestrator;
