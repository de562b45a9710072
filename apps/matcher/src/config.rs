use std::collections::BTreeSet;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::errors::MatchError;
use crate::text::default_stop_words;

const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;
const DEFAULT_BLEND_WEIGHT: f64 = 0.3;
const DEFAULT_LLM_TIMEOUT_SECONDS: u64 = 30;
const DEFAULT_LLM_MAX_RETRIES: u32 = 3;

/// Matching pipeline configuration, constructed once per batch and validated
/// before any scoring starts. Every recognized option is an explicit field;
/// out-of-range values are rejected at validation, never mid-batch.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Combined-score threshold for shortlisting, in [0, 1].
    pub similarity_threshold: f64,
    /// Whether the semantic augmentation step runs at all.
    pub llm_enabled: bool,
    /// Credential for the language-model service. `None` disables semantic
    /// scoring for the whole batch regardless of `llm_enabled`.
    pub llm_api_key: Option<String>,
    /// Weight of the semantic score in the combined blend, in [0, 1].
    pub llm_blend_weight: f64,
    /// Per-call timeout for language-model requests.
    pub llm_timeout_seconds: u64,
    /// Retries per language-model call beyond the first attempt.
    pub llm_max_retries: u32,
    /// Bound on concurrent per-candidate scoring work.
    pub max_concurrent_workers: usize,
    /// Stop words removed during normalization.
    pub stop_words: BTreeSet<String>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            llm_enabled: false,
            llm_api_key: None,
            llm_blend_weight: DEFAULT_BLEND_WEIGHT,
            llm_timeout_seconds: DEFAULT_LLM_TIMEOUT_SECONDS,
            llm_max_retries: DEFAULT_LLM_MAX_RETRIES,
            max_concurrent_workers: default_worker_count(),
            stop_words: default_stop_words(),
        }
    }
}

impl MatchConfig {
    /// Reads configuration from the environment (loading `.env` if present).
    /// Unset variables keep their defaults; set-but-unparseable values are
    /// errors. Setting `GROQ_API_KEY` enables semantic scoring.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        if let Some(v) = parse_env::<f64>("SIMILARITY_THRESHOLD")? {
            config.similarity_threshold = v;
        }
        if let Some(v) = parse_env::<f64>("LLM_BLEND_WEIGHT")? {
            config.llm_blend_weight = v;
        }
        if let Some(v) = parse_env::<u64>("LLM_TIMEOUT_SECONDS")? {
            config.llm_timeout_seconds = v;
        }
        if let Some(v) = parse_env::<u32>("LLM_MAX_RETRIES")? {
            config.llm_max_retries = v;
        }
        if let Some(v) = parse_env::<usize>("MAX_CONCURRENT_WORKERS")? {
            config.max_concurrent_workers = v;
        }
        if let Ok(raw) = std::env::var("STOP_WORDS") {
            config.stop_words = raw
                .split(',')
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect();
        }
        if let Ok(key) = std::env::var("GROQ_API_KEY") {
            if !key.trim().is_empty() {
                config.llm_api_key = Some(key.trim().to_string());
                config.llm_enabled = true;
            }
        }
        if let Some(v) = parse_env::<bool>("LLM_ENABLED")? {
            config.llm_enabled = v;
        }

        Ok(config)
    }

    /// Rejects out-of-range values. Called by the coordinator before any
    /// scoring starts; a failure here is fatal for the batch.
    pub fn validate(&self) -> Result<(), MatchError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(MatchError::Config(format!(
                "similarity_threshold must be in [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&self.llm_blend_weight) {
            return Err(MatchError::Config(format!(
                "llm_blend_weight must be in [0, 1], got {}",
                self.llm_blend_weight
            )));
        }
        if self.max_concurrent_workers == 0 {
            return Err(MatchError::Config(
                "max_concurrent_workers must be at least 1".to_string(),
            ));
        }
        if self.llm_timeout_seconds == 0 {
            return Err(MatchError::Config(
                "llm_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_seconds)
    }
}

fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .with_context(|| format!("invalid value for '{key}': {raw}")),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = MatchConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.similarity_threshold, 0.3);
        assert!(!config.llm_enabled);
        assert!(config.max_concurrent_workers >= 1);
        assert!(config.stop_words.contains("the"));
    }

    #[test]
    fn test_threshold_out_of_range_rejected() {
        let config = MatchConfig {
            similarity_threshold: 1.2,
            ..MatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(MatchError::Config(_))));

        let config = MatchConfig {
            similarity_threshold: -0.1,
            ..MatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(MatchError::Config(_))));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = MatchConfig {
            similarity_threshold: f64::NAN,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_blend_weight_out_of_range_rejected() {
        let config = MatchConfig {
            llm_blend_weight: 1.5,
            ..MatchConfig::default()
        };
        assert!(matches!(config.validate(), Err(MatchError::Config(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = MatchConfig {
            max_concurrent_workers: 0,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = MatchConfig {
            llm_timeout_seconds: 0,
            ..MatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
