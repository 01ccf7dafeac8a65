//! Match result types.

use serde::{Deserialize, Serialize};

/// One ranked job match for a resume.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredJob {
    pub job_id: String,
    pub title: String,
    pub company: String,
    pub location: String,
    pub employment_type: String,
    /// Distinct required-skill names the resume matched, sorted.
    pub matching_skills: Vec<String>,
    /// Count of distinct matched skills.
    pub skill_overlap: usize,
    /// Count of distinct skills the job requires overall.
    pub total_required: usize,
    /// `skill_overlap / total_required`, in [0, 1].
    pub coverage: f64,
    /// Currently equal to `skill_overlap`; a separate field so future
    /// reweighting does not change the sort key contract.
    pub score: f64,
}
