use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured fields pulled out of a resume by the upstream entity
/// extractor. Everything here is best-effort: fields may be empty or
/// missing, and the pipeline consumes them as-is — for tie-breaking and
/// requirement display — without re-deriving anything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedProfile {
    pub skills: BTreeSet<String>,
    pub education: Vec<EducationRecord>,
    pub experience_years: u32,
}

/// One educational qualification as extracted upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EducationRecord {
    pub degree: Option<String>,
    pub institution: Option<String>,
    pub graduation_year: Option<u16>,
    pub gpa: Option<f32>,
}

/// One uploaded candidate as handed over by the document parser.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Candidate {
    /// Opaque upstream identifier; also the final ranking tie-break key.
    pub id: String,
    /// Raw extracted resume text. Read-only for the duration of matching.
    pub resume_text: String,
    /// Whether the document parser produced usable text. `false` sends the
    /// candidate straight to an error record without entering scoring.
    pub extraction_succeeded: bool,
    pub profile: ExtractedProfile,
}

impl Candidate {
    pub fn new(id: impl Into<String>, resume_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resume_text: resume_text.into(),
            extraction_succeeded: true,
            profile: ExtractedProfile::default(),
        }
    }

    /// A candidate whose document could not be parsed upstream.
    pub fn failed_extraction(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resume_text: String::new(),
            extraction_succeeded: false,
            profile: ExtractedProfile::default(),
        }
    }

    pub fn with_profile(mut self, profile: ExtractedProfile) -> Self {
        self.profile = profile;
        self
    }
}
