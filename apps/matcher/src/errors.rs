use thiserror::Error;

/// Batch-level error type.
///
/// Per-candidate failures never surface here; the coordinator converts them
/// into [`crate::models::MatchStatus::Error`] records so one bad resume
/// cannot abort its siblings. The only fatal kind is a configuration that
/// fails validation before scoring starts.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Configuration error: {0}")]
    Config(String),
}
