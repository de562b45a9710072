use serde::{Deserialize, Serialize};

/// An immutable job description for one matching session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDescription {
    pub text: String,
    /// Required-skill terms supplied by the upstream entity extractor, used
    /// for requirement-coverage display on score records.
    pub requirement_terms: Vec<String>,
    /// Optional per-job override of the session similarity threshold.
    /// Validated against [0, 1] at batch start.
    pub similarity_threshold: Option<f64>,
}

impl JobDescription {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            requirement_terms: Vec::new(),
            similarity_threshold: None,
        }
    }

    pub fn with_requirements(mut self, terms: Vec<String>) -> Self {
        self.requirement_terms = terms;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = Some(threshold);
        self
    }
}
