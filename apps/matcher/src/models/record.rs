use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Final disposition of one candidate within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Shortlisted,
    Rejected,
    Error,
}

/// Write-once scoring result for one candidate in one session. A rerun of
/// the batch produces fresh records; nothing is mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub candidate_id: String,
    /// Cosine similarity of the TF-IDF vectors, in [0, 1]. Always present.
    pub lexical_score: f64,
    /// LLM relevance rating in [0, 1]. Present only when the call for this
    /// candidate succeeded.
    pub semantic_score: Option<f64>,
    /// Blend of the two signals, in [0, 1]. Equals `lexical_score` exactly
    /// when no semantic score is present.
    pub combined_score: f64,
    pub status: MatchStatus,
    /// Tie-break key carried over from the extracted profile.
    pub experience_years: u32,
    /// Job requirement terms covered by the candidate's extracted skills.
    /// Display data for downstream consumers; never feeds the scores.
    pub matched_requirements: Vec<String>,
}

/// Aggregate statistics over one completed batch run. Owned exclusively by
/// the coordinator and written once, after all candidate results are in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingSession {
    pub id: Uuid,
    pub total: usize,
    pub shortlisted: usize,
    pub rejected: usize,
    pub errors: usize,
    /// Mean combined score over scored (non-error) candidates; 0.0 when
    /// every candidate errored or the batch was empty.
    pub avg_combined_score: f64,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&MatchStatus::Shortlisted).unwrap(),
            r#""shortlisted""#
        );
        assert_eq!(
            serde_json::to_string(&MatchStatus::Rejected).unwrap(),
            r#""rejected""#
        );
        assert_eq!(
            serde_json::to_string(&MatchStatus::Error).unwrap(),
            r#""error""#
        );
    }

    #[test]
    fn test_score_record_round_trips_absent_semantic_score() {
        let record = ScoreRecord {
            candidate_id: "c-17".to_string(),
            lexical_score: 0.42,
            semantic_score: None,
            combined_score: 0.42,
            status: MatchStatus::Shortlisted,
            experience_years: 4,
            matched_requirements: vec!["sql".to_string()],
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""semantic_score":null"#));

        let back: ScoreRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.candidate_id, "c-17");
        assert_eq!(back.semantic_score, None);
        assert_eq!(back.status, MatchStatus::Shortlisted);
    }
}
