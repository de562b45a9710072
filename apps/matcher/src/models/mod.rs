pub mod candidate;
pub mod job;
pub mod record;

pub use candidate::{Candidate, EducationRecord, ExtractedProfile};
pub use job::JobDescription;
pub use record::{MatchStatus, MatchingSession, ScoreRecord};
