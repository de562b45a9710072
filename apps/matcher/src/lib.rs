//! Resume-to-job matching and ranking pipeline.
//!
//! Turns one job description and a batch of extracted resume texts into a
//! deterministic, thresholded shortlist: batch-local TF-IDF vectors, cosine
//! similarity, an optional LLM relevance score blended in, and a total-order
//! ranking with per-candidate fault isolation.
//!
//! Document parsing, entity extraction, persistence, and export live in
//! external services; this crate consumes their outputs and hands back
//! [`ScoreRecord`]s and a [`MatchingSession`] aggregate.

pub mod batch;
pub mod config;
pub mod errors;
pub mod llm;
pub mod models;
pub mod ranking;
pub mod scoring;
pub mod similarity;
pub mod text;
pub mod vectorize;

pub use batch::{BatchCoordinator, MatchOutcome};
pub use config::MatchConfig;
pub use errors::MatchError;
pub use llm::{GroqClient, LlmError, SemanticOutcome, SemanticScorer};
pub use models::{
    Candidate, EducationRecord, ExtractedProfile, JobDescription, MatchStatus, MatchingSession,
    ScoreRecord,
};
