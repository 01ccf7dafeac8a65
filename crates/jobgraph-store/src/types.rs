//! Data types for graph nodes, edges, and read-query results.

use serde::{Deserialize, Serialize};

/// Node labels in the job knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeLabel {
    Job,
    Resume,
    Company,
    Location,
    Skill,
    Certification,
    Education,
    Tool,
    Responsibility,
}

impl NodeLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Job => "Job",
            NodeLabel::Resume => "Resume",
            NodeLabel::Company => "Company",
            NodeLabel::Location => "Location",
            NodeLabel::Skill => "Skill",
            NodeLabel::Certification => "Certification",
            NodeLabel::Education => "Education",
            NodeLabel::Tool => "Tool",
            NodeLabel::Responsibility => "Responsibility",
        }
    }
}

/// Directed, typed edges. No payload beyond the type itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Company → Job
    Posts,
    /// Job → Location
    LocatedAt,
    /// Job → Skill
    RequiresSkill,
    /// Job → Certification
    RequiresCert,
    /// Job → Education
    RequiresEdu,
    /// Job → Tool
    UsesTool,
    /// Job → Responsibility
    HasResponsibility,
    /// Resume → Skill
    HasSkill,
}

impl EdgeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeType::Posts => "POSTS",
            EdgeType::LocatedAt => "LOCATED_AT",
            EdgeType::RequiresSkill => "REQUIRES_SKILL",
            EdgeType::RequiresCert => "REQUIRES_CERT",
            EdgeType::RequiresEdu => "REQUIRES_EDU",
            EdgeType::UsesTool => "USES_TOOL",
            EdgeType::HasResponsibility => "HAS_RESPONSIBILITY",
            EdgeType::HasSkill => "HAS_SKILL",
        }
    }
}

/// One (job, required skill) pair from a REQUIRES_SKILL edge.
///
/// Edges and skill keys are both unique, so the rows for a given job are
/// already distinct skills — counting them per job gives `total_required`.
#[derive(Debug, Clone)]
pub struct JobSkillRow {
    pub job_node_id: i64,
    pub job_id: String,
    pub title: Option<String>,
    pub skill: String,
}

/// A row in the job listing (title, type, location).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobListing {
    pub title: Option<String>,
    pub employment_type: Option<String>,
    pub location: String,
}

/// A job surfaced by skill search, with the skill name that matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillSearchHit {
    pub title: Option<String>,
    pub location: String,
    pub skill_match: String,
}

/// Skills and tools required for one job title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetails {
    pub title: Option<String>,
    pub skills: Vec<String>,
    pub tools: Vec<String>,
}

/// A resume node summary (id, name, email).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Store-level statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub total_nodes: i64,
    pub total_edges: i64,
    pub jobs: i64,
    pub resumes: i64,
    pub skills: i64,
    pub companies: i64,
    pub db_path: String,
    pub db_size_mb: f64,
}
