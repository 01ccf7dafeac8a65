//! The structured job record produced by the external extraction step.

use serde::{Deserialize, Serialize};

/// A parsed job description, as delivered by the extraction pipeline.
///
/// Every field is optional: extraction output is best-effort and missing
/// scalars are resolved to sentinel values at ingestion time rather than
/// failing the call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobRecord {
    /// Stable job identity; generated when absent.
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub job_title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub employment_type: Option<String>,
    #[serde(default)]
    pub experience_required: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub education_required: Vec<String>,
    #[serde(default)]
    pub certifications_required: Vec<String>,
    #[serde(default)]
    pub skills_required: Vec<String>,
    #[serde(default)]
    pub tools_and_technologies: Vec<String>,
    #[serde(default)]
    pub responsibilities: Vec<String>,
}
