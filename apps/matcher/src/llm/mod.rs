/// Semantic relevance scoring via an external language model.
///
/// ARCHITECTURAL RULE: no other module may call the model service directly.
/// All LLM interactions go through this module, and every failure degrades
/// to [`SemanticOutcome::Unavailable`] — never to a batch abort.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::MatchConfig;

pub mod prompts;

const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
/// The model used for relevance scoring.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "llama3-8b-8192";
const MAX_TOKENS: u32 = 256;
const TEMPERATURE: f64 = 0.1;
/// Cap on the backoff exponent so configured retry counts cannot produce
/// pathological sleeps.
const MAX_BACKOFF_SHIFT: u32 = 6;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Result of the semantic augmentation step for one candidate, joined
/// deterministically before ranking. `Unavailable` is a degraded state,
/// not an error: the candidate proceeds on its lexical score alone.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticOutcome {
    Score(f64),
    Unavailable(String),
}

impl SemanticOutcome {
    pub fn score(&self) -> Option<f64> {
        match self {
            Self::Score(score) => Some(*score),
            Self::Unavailable(_) => None,
        }
    }
}

/// The semantic scorer seam. The coordinator holds one as
/// `Arc<dyn SemanticScorer>`, so tests and alternative backends swap in
/// without touching the pipeline.
#[async_trait]
pub trait SemanticScorer: Send + Sync {
    /// Rates how relevant a resume is to a job description, in [0, 1].
    async fn score(&self, job_text: &str, resume_text: &str) -> Result<f64, LlmError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RelevanceReply {
    relevance: f64,
}

/// Client for the Groq chat completions API with per-call timeout and
/// bounded exponential-backoff retry.
#[derive(Clone)]
pub struct GroqClient {
    client: Client,
    api_key: String,
    max_retries: u32,
}

impl GroqClient {
    pub fn new(api_key: String, timeout: Duration, max_retries: u32) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
            max_retries,
        }
    }

    /// Builds a client from configuration. `None` when no credential is
    /// set, which skips semantic scoring for the whole batch.
    pub fn from_config(config: &MatchConfig) -> Option<Self> {
        config
            .llm_api_key
            .as_ref()
            .map(|key| Self::new(key.clone(), config.llm_timeout(), config.llm_max_retries))
    }

    /// Makes a raw chat completion call, returning the reply text.
    /// Retries on 429 (rate limit) and 5xx errors with exponential backoff.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let request_body = ChatRequest {
            model: MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, ...
                let shift = (attempt - 1).min(MAX_BACKOFF_SHIFT);
                let delay = Duration::from_millis(1000 * (1 << shift));
                warn!(
                    "LLM call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self
                .client
                .post(GROQ_API_URL)
                .bearer_auth(&self.api_key)
                .header("content-type", "application/json")
                .json(&request_body)
                .send()
                .await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(LlmError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                warn!("LLM API returned {}: {}", status, body);
                last_error = Some(LlmError::Api {
                    status: status.as_u16(),
                    message: body,
                });
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ApiError>(&body)
                    .map(|e| e.error.message)
                    .unwrap_or(body);
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            let chat: ChatResponse = response.json().await?;
            let content = chat
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content)
                .filter(|text| !text.trim().is_empty())
                .ok_or(LlmError::EmptyContent)?;

            debug!("LLM call succeeded after {} attempt(s)", attempt + 1);
            return Ok(content);
        }

        Err(last_error.unwrap_or(LlmError::RateLimited {
            retries: self.max_retries,
        }))
    }
}

#[async_trait]
impl SemanticScorer for GroqClient {
    async fn score(&self, job_text: &str, resume_text: &str) -> Result<f64, LlmError> {
        let prompt = prompts::RELEVANCE_PROMPT_TEMPLATE
            .replace("{job_text}", job_text)
            .replace("{resume_text}", resume_text);
        let content = self.call(&prompt, prompts::RELEVANCE_SYSTEM).await?;
        parse_relevance(&content)
    }
}

/// Parses the model's JSON reply and normalizes the 0-100 rating into
/// [0, 1]. Out-of-range ratings are clamped rather than rejected.
fn parse_relevance(text: &str) -> Result<f64, LlmError> {
    let text = strip_json_fences(text);
    let reply: RelevanceReply = serde_json::from_str(text)?;
    Ok((reply.relevance / 100.0).clamp(0.0, 1.0))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_relevance_normalizes_to_unit_interval() {
        let score = parse_relevance(r#"{"relevance": 87}"#).unwrap();
        assert!((score - 0.87).abs() < 1e-12, "score was {score}");
    }

    #[test]
    fn test_parse_relevance_strips_fences() {
        let score = parse_relevance("```json\n{\"relevance\": 40}\n```").unwrap();
        assert!((score - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_parse_relevance_clamps_out_of_range_ratings() {
        assert_eq!(parse_relevance(r#"{"relevance": 150}"#).unwrap(), 1.0);
        assert_eq!(parse_relevance(r#"{"relevance": -20}"#).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_relevance_rejects_malformed_reply() {
        assert!(matches!(
            parse_relevance("the resume looks great"),
            Err(LlmError::Parse(_))
        ));
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"relevance\": 10}\n```";
        assert_eq!(strip_json_fences(input), "{\"relevance\": 10}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"relevance\": 10}\n```";
        assert_eq!(strip_json_fences(input), "{\"relevance\": 10}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"relevance\": 10}";
        assert_eq!(strip_json_fences(input), "{\"relevance\": 10}");
    }

    #[test]
    fn test_from_config_requires_credential() {
        let config = MatchConfig::default();
        assert!(GroqClient::from_config(&config).is_none());

        let config = MatchConfig {
            llm_api_key: Some("gsk_test".to_string()),
            ..MatchConfig::default()
        };
        assert!(GroqClient::from_config(&config).is_some());
    }

    #[test]
    fn test_semantic_outcome_score_accessor() {
        assert_eq!(SemanticOutcome::Score(0.7).score(), Some(0.7));
        assert_eq!(
            SemanticOutcome::Unavailable("timeout".to_string()).score(),
            None
        );
    }
}
