//! Threshold application and deterministic output ordering.

use std::cmp::Ordering;

use crate::models::{MatchStatus, ScoreRecord};

/// Applies the similarity threshold: at or above shortlists, below rejects.
pub fn assign_status(combined_score: f64, threshold: f64) -> MatchStatus {
    if combined_score >= threshold {
        MatchStatus::Shortlisted
    } else {
        MatchStatus::Rejected
    }
}

/// Sorts records into the final output order.
///
/// Scored records come first, by descending combined score, ties broken by
/// descending experience years then ascending candidate id. Errored
/// candidates follow, ordered by candidate id. The ordering is total, so
/// the output never depends on the order candidates were processed.
pub fn sort_records(records: &mut [ScoreRecord]) {
    records.sort_by(compare);
}

fn compare(a: &ScoreRecord, b: &ScoreRecord) -> Ordering {
    match (a.status == MatchStatus::Error, b.status == MatchStatus::Error) {
        (true, true) => a.candidate_id.cmp(&b.candidate_id),
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b
            .combined_score
            // Scores are clamped to [0, 1] upstream, so total_cmp never
            // sees NaN and the comparison is a genuine total order.
            .total_cmp(&a.combined_score)
            .then_with(|| b.experience_years.cmp(&a.experience_years))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id)),
    }
}

/// Human-readable verdict for a combined score, for downstream display.
pub fn recommendation(combined_score: f64) -> &'static str {
    if combined_score >= 0.7 {
        "Excellent match - Highly recommended for interview"
    } else if combined_score >= 0.5 {
        "Good match - Recommended for interview"
    } else if combined_score >= 0.3 {
        "Moderate match - Consider for interview"
    } else if combined_score >= 0.2 {
        "Low match - Review manually before decision"
    } else {
        "Poor match - May not meet core requirements"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, combined: f64, years: u32, status: MatchStatus) -> ScoreRecord {
        ScoreRecord {
            candidate_id: id.to_string(),
            lexical_score: combined,
            semantic_score: None,
            combined_score: combined,
            status,
            experience_years: years,
            matched_requirements: Vec::new(),
        }
    }

    fn ids(records: &[ScoreRecord]) -> Vec<&str> {
        records.iter().map(|r| r.candidate_id.as_str()).collect()
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert_eq!(assign_status(0.3, 0.3), MatchStatus::Shortlisted);
        assert_eq!(assign_status(0.299, 0.3), MatchStatus::Rejected);
    }

    #[test]
    fn test_sorts_by_descending_combined_score() {
        let mut records = vec![
            record("a", 0.2, 0, MatchStatus::Rejected),
            record("b", 0.9, 0, MatchStatus::Shortlisted),
            record("c", 0.5, 0, MatchStatus::Shortlisted),
        ];
        sort_records(&mut records);
        assert_eq!(ids(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_score_tie_broken_by_experience_then_id() {
        let mut records = vec![
            record("z", 0.5, 2, MatchStatus::Shortlisted),
            record("a", 0.5, 2, MatchStatus::Shortlisted),
            record("m", 0.5, 7, MatchStatus::Shortlisted),
        ];
        sort_records(&mut records);
        assert_eq!(ids(&records), vec!["m", "a", "z"]);
    }

    #[test]
    fn test_errors_sort_last_by_id() {
        let mut records = vec![
            record("e2", 0.0, 0, MatchStatus::Error),
            record("ok", 0.1, 0, MatchStatus::Rejected),
            record("e1", 0.0, 0, MatchStatus::Error),
        ];
        sort_records(&mut records);
        assert_eq!(ids(&records), vec!["ok", "e1", "e2"]);
    }

    #[test]
    fn test_ordering_independent_of_input_order() {
        let mut forward = vec![
            record("a", 0.8, 3, MatchStatus::Shortlisted),
            record("b", 0.8, 3, MatchStatus::Shortlisted),
            record("c", 0.1, 1, MatchStatus::Rejected),
        ];
        let mut reversed: Vec<ScoreRecord> = forward.iter().rev().cloned().collect();
        sort_records(&mut forward);
        sort_records(&mut reversed);
        assert_eq!(ids(&forward), ids(&reversed));
    }

    #[test]
    fn test_recommendation_bands() {
        assert!(recommendation(0.85).contains("Excellent"));
        assert!(recommendation(0.55).contains("Good"));
        assert!(recommendation(0.35).contains("Moderate"));
        assert!(recommendation(0.25).contains("Low"));
        assert!(recommendation(0.05).contains("Poor"));
    }
}
