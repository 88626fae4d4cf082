//! Streaming chat orchestration with a transparent fact-check tool.
//!
//! A conversation turn is streamed from the model; when the model asks for a fact check the
//! query is answered by a separate request and the model's continuation is streamed back as
//! if it were one uninterrupted answer.

pub mod errors;
pub mod fact_check;
pub mod models;
pub mod orchestrator;
pub mod prompt;
pub mod providers;

pub use errors::{GenerationError, GenerationResult};
pub use fact_check::{FactCheckOutcome, FactChecker};
pub use orchestrator::Orchestrator;
