//! Batch orchestration: one job description against N candidates.
//!
//! The coordinator owns every per-batch resource — normalizer, fitted
//! TF-IDF model, semantic scorer handle, session aggregate — for exactly
//! one run. Its central contract is fault isolation: a failure while
//! processing one candidate becomes that candidate's error record and
//! never aborts its siblings.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::MatchConfig;
use crate::errors::MatchError;
use crate::llm::{SemanticOutcome, SemanticScorer};
use crate::models::{Candidate, JobDescription, MatchStatus, MatchingSession, ScoreRecord};
use crate::ranking::{assign_status, sort_records};
use crate::scoring::combine_scores;
use crate::similarity::cosine_similarity;
use crate::text::Normalizer;
use crate::vectorize::TfidfModel;

/// Ranked records plus the session aggregate for one completed batch run.
#[derive(Debug, Clone, Serialize)]
pub struct MatchOutcome {
    pub records: Vec<ScoreRecord>,
    pub session: MatchingSession,
}

/// Per-candidate result of the semantic step. `Err` carries the reason a
/// scoring task itself died (as opposed to a model call failing, which is
/// an `Ok(Unavailable)` degradation).
type SemanticResult = Result<SemanticOutcome, String>;

/// Orchestrates the full pipeline over one batch.
pub struct BatchCoordinator {
    config: MatchConfig,
    normalizer: Normalizer,
    semantic: Option<Arc<dyn SemanticScorer>>,
}

impl BatchCoordinator {
    /// Validates the configuration and builds a coordinator. Configuration
    /// errors are fatal here, before any scoring starts.
    pub fn new(config: MatchConfig) -> Result<Self, MatchError> {
        config.validate()?;
        let normalizer = Normalizer::new(config.stop_words.clone());
        Ok(Self {
            config,
            normalizer,
            semantic: None,
        })
    }

    /// Installs a semantic scorer. Without one — or with `llm_enabled`
    /// false — every candidate scores lexical-only.
    pub fn with_semantic_scorer(mut self, scorer: Arc<dyn SemanticScorer>) -> Self {
        self.semantic = Some(scorer);
        self
    }

    /// Runs the batch to completion without external cancellation.
    pub async fn run(
        &self,
        job: &JobDescription,
        candidates: &[Candidate],
    ) -> Result<MatchOutcome, MatchError> {
        self.run_with_cancel(job, candidates, CancellationToken::new())
            .await
    }

    /// Runs the batch with cooperative cancellation: once `cancel` fires no
    /// new semantic calls are dispatched, in-flight calls complete or time
    /// out, and every candidate still gets a record — undispatched ones on
    /// their lexical score alone.
    pub async fn run_with_cancel(
        &self,
        job: &JobDescription,
        candidates: &[Candidate],
        cancel: CancellationToken,
    ) -> Result<MatchOutcome, MatchError> {
        let started_at = Utc::now();
        let timer = Instant::now();
        let session_id = Uuid::new_v4();

        let threshold = job
            .similarity_threshold
            .unwrap_or(self.config.similarity_threshold);
        if !(0.0..=1.0).contains(&threshold) {
            return Err(MatchError::Config(format!(
                "job similarity threshold must be in [0, 1], got {threshold}"
            )));
        }

        info!(
            %session_id,
            candidates = candidates.len(),
            threshold,
            "starting matching session"
        );

        // Candidates whose upstream extraction failed never enter scoring.
        let (viable, failed): (Vec<&Candidate>, Vec<&Candidate>) =
            candidates.iter().partition(|c| c.extraction_succeeded);

        // Single synchronous fit over the job description plus every viable
        // resume. Every document vector depends on the shared vocabulary
        // and IDF statistics, so this step cannot overlap scoring.
        let mut corpus: Vec<Vec<String>> = Vec::with_capacity(viable.len() + 1);
        corpus.push(self.normalizer.tokenize(&job.text));
        for candidate in &viable {
            corpus.push(self.normalizer.tokenize(&candidate.resume_text));
        }
        let model = TfidfModel::fit(&corpus);

        let job_vector = model.transform(&corpus[0]);
        let lexical: Vec<f64> = corpus[1..]
            .iter()
            .map(|tokens| cosine_similarity(&job_vector, &model.transform(tokens)))
            .collect();

        let semantic = self.semantic_results(job, &viable, &cancel).await;

        let mut records: Vec<ScoreRecord> = Vec::with_capacity(candidates.len());
        for candidate in &failed {
            warn!(candidate = %candidate.id, "document extraction failed upstream");
            records.push(error_record(candidate));
        }
        for (i, candidate) in viable.iter().enumerate() {
            records.push(match &semantic[i] {
                Ok(outcome) => {
                    let semantic_score = outcome.score();
                    let combined =
                        combine_scores(lexical[i], semantic_score, self.config.llm_blend_weight);
                    ScoreRecord {
                        candidate_id: candidate.id.clone(),
                        lexical_score: lexical[i],
                        semantic_score,
                        combined_score: combined,
                        status: assign_status(combined, threshold),
                        experience_years: candidate.profile.experience_years,
                        matched_requirements: matched_requirements(job, candidate),
                    }
                }
                Err(reason) => {
                    warn!(candidate = %candidate.id, "candidate scoring failed: {reason}");
                    error_record(candidate)
                }
            });
        }

        sort_records(&mut records);

        let session = build_session(session_id, &records, started_at, timer.elapsed().as_millis());
        info!(
            %session_id,
            shortlisted = session.shortlisted,
            rejected = session.rejected,
            errors = session.errors,
            duration_ms = session.duration_ms,
            "matching session complete"
        );

        Ok(MatchOutcome { records, session })
    }

    /// Dispatches the semantic step for every viable candidate under the
    /// configured concurrency bound and joins the results in candidate
    /// order, so execution order never leaks into the output.
    async fn semantic_results(
        &self,
        job: &JobDescription,
        viable: &[&Candidate],
        cancel: &CancellationToken,
    ) -> Vec<SemanticResult> {
        let scorer = match (&self.semantic, self.config.llm_enabled) {
            (Some(scorer), true) => Arc::clone(scorer),
            _ => {
                debug!("semantic scoring disabled; proceeding lexical-only");
                return vec![
                    Ok(SemanticOutcome::Unavailable(
                        "semantic scoring disabled".to_string()
                    ));
                    viable.len()
                ];
            }
        };

        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_workers));
        let mut handles = Vec::with_capacity(viable.len());
        for (idx, candidate) in viable.iter().enumerate() {
            let scorer = Arc::clone(&scorer);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let job_text = job.text.clone();
            let resume_text = candidate.resume_text.clone();
            let candidate_id = candidate.id.clone();
            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return SemanticOutcome::Unavailable("scheduler shut down".to_string())
                    }
                };
                // Dispatch gate: nothing new starts once the batch is
                // cancelled; calls already past this point run to their
                // timeout.
                if cancel.is_cancelled() {
                    return SemanticOutcome::Unavailable(
                        "batch cancelled before dispatch".to_string(),
                    );
                }
                match scorer.score(&job_text, &resume_text).await {
                    Ok(score) => SemanticOutcome::Score(score.clamp(0.0, 1.0)),
                    Err(e) => {
                        warn!(candidate = %candidate_id, "semantic score unavailable: {e}");
                        SemanticOutcome::Unavailable(e.to_string())
                    }
                }
            });
            handles.push((idx, handle));
        }

        let mut results: Vec<SemanticResult> = (0..viable.len())
            .map(|_| {
                Ok(SemanticOutcome::Unavailable(
                    "not dispatched".to_string(),
                ))
            })
            .collect();
        for (idx, handle) in handles {
            results[idx] = match handle.await {
                Ok(outcome) => Ok(outcome),
                Err(e) => Err(format!("scoring task failed: {e}")),
            };
        }
        results
    }
}

fn error_record(candidate: &Candidate) -> ScoreRecord {
    ScoreRecord {
        candidate_id: candidate.id.clone(),
        lexical_score: 0.0,
        semantic_score: None,
        combined_score: 0.0,
        status: MatchStatus::Error,
        experience_years: candidate.profile.experience_years,
        matched_requirements: Vec::new(),
    }
}

/// Job requirement terms covered by the candidate's extracted skills,
/// case-insensitive. Display data only; never feeds the scores.
fn matched_requirements(job: &JobDescription, candidate: &Candidate) -> Vec<String> {
    let skills: BTreeSet<String> = candidate
        .profile
        .skills
        .iter()
        .map(|s| s.to_lowercase())
        .collect();
    let mut matched: Vec<String> = job
        .requirement_terms
        .iter()
        .filter(|term| skills.contains(&term.to_lowercase()))
        .cloned()
        .collect();
    matched.sort();
    matched.dedup();
    matched
}

/// Single aggregation pass over the finished records. The session is the
/// only shared-looking state in the pipeline, and it is written exactly
/// once, here, after every per-candidate result has been collected.
fn build_session(
    id: Uuid,
    records: &[ScoreRecord],
    started_at: DateTime<Utc>,
    elapsed_ms: u128,
) -> MatchingSession {
    let shortlisted = records
        .iter()
        .filter(|r| r.status == MatchStatus::Shortlisted)
        .count();
    let rejected = records
        .iter()
        .filter(|r| r.status == MatchStatus::Rejected)
        .count();
    let errors = records
        .iter()
        .filter(|r| r.status == MatchStatus::Error)
        .count();
    let scored = shortlisted + rejected;
    let avg_combined_score = if scored > 0 {
        records
            .iter()
            .filter(|r| r.status != MatchStatus::Error)
            .map(|r| r.combined_score)
            .sum::<f64>()
            / scored as f64
    } else {
        0.0
    };

    MatchingSession {
        id,
        total: records.len(),
        shortlisted,
        rejected,
        errors,
        avg_combined_score,
        started_at,
        duration_ms: elapsed_ms as u64,
    }
}
