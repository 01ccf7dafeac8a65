//! Skill match engine.
//!
//! The ranking is computed in memory from a single pass over the graph's
//! REQUIRES_SKILL pairs: group by job, count total required skills and
//! collect matched names, then sort and truncate. Matching is
//! case-insensitive even though skill storage keys are case-sensitive.

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;

use jobgraph_core::normalize::{fold, split_list};
use jobgraph_core::{Error, Result};
use jobgraph_store::{GraphStore, NodeLabel};

use crate::types::ScoredJob;

const UNKNOWN: &str = "Unknown";
const NOT_SPECIFIED: &str = "Not specified";

struct Candidate {
    job_node_id: i64,
    job_id: String,
    title: String,
    matched: BTreeSet<String>,
    total_required: usize,
}

/// Computes ranked job matches for a resume. Stateless; every call
/// recomputes from the current graph.
pub struct SkillMatcher;

impl SkillMatcher {
    /// Rank jobs against the resume's skills.
    ///
    /// Fails with `Error::NotFound` when the resume id is unknown. A `limit`
    /// of 0 yields an empty result, not an error. Ordering is deterministic:
    /// skill overlap descending, then coverage descending (exact comparison,
    /// no epsilon), then job title ascending.
    pub fn match_jobs(
        store: &GraphStore,
        resume_id: &str,
        limit: usize,
    ) -> Result<Vec<ScoredJob>> {
        let resume_node = store
            .node_id(NodeLabel::Resume, resume_id)?
            .ok_or_else(|| Error::NotFound(format!("resume {}", resume_id)))?;

        if limit == 0 {
            return Ok(Vec::new());
        }

        // A stored resume skill value may itself be a comma-joined list;
        // split, trim, drop empties, and de-duplicate case-insensitively.
        let mut tokens: HashSet<String> = HashSet::new();
        for value in store.resume_skill_values(resume_node)? {
            for part in split_list(&value) {
                tokens.insert(fold(&part));
            }
        }
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        // Group REQUIRES_SKILL pairs by job. Rows per job are distinct
        // skills, so the row count is total_required.
        let mut candidates: HashMap<i64, Candidate> = HashMap::new();
        for row in store.requires_skill_pairs()? {
            let entry = candidates
                .entry(row.job_node_id)
                .or_insert_with(|| Candidate {
                    job_node_id: row.job_node_id,
                    job_id: row.job_id,
                    title: row.title.unwrap_or_default(),
                    matched: BTreeSet::new(),
                    total_required: 0,
                });
            entry.total_required += 1;
            if tokens.contains(&fold(&row.skill)) {
                entry.matched.insert(row.skill);
            }
        }

        let mut scored: Vec<(Candidate, f64)> = candidates
            .into_values()
            .filter(|c| !c.matched.is_empty())
            .map(|c| {
                let coverage = if c.total_required > 0 {
                    c.matched.len() as f64 / c.total_required as f64
                } else {
                    0.0
                };
                (c, coverage)
            })
            .collect();

        scored.sort_by(|(a, cov_a), (b, cov_b)| {
            b.matched
                .len()
                .cmp(&a.matched.len())
                .then_with(|| cov_b.partial_cmp(cov_a).unwrap_or(Ordering::Equal))
                .then_with(|| a.title.cmp(&b.title))
        });
        scored.truncate(limit);

        debug!(
            "resume {}: {} skill tokens, {} ranked jobs",
            resume_id,
            tokens.len(),
            scored.len()
        );

        scored
            .into_iter()
            .map(|(c, coverage)| {
                let company = store.job_company(c.job_node_id)?;
                let location = store.job_location(c.job_node_id)?;
                let employment_type = store
                    .node_props(c.job_node_id)?
                    .and_then(|p| p["employment_type"].as_str().map(String::from));

                let overlap = c.matched.len();
                Ok(ScoredJob {
                    job_id: c.job_id,
                    title: c.title,
                    company: company.unwrap_or_else(|| UNKNOWN.to_string()),
                    location: location.unwrap_or_else(|| UNKNOWN.to_string()),
                    employment_type: employment_type
                        .unwrap_or_else(|| NOT_SPECIFIED.to_string()),
                    matching_skills: c.matched.into_iter().collect(),
                    skill_overlap: overlap,
                    total_required: c.total_required,
                    coverage,
                    score: overlap as f64,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobgraph_ingest::{JobIngester, JobRecord};
    use jobgraph_store::EdgeType;
    use tempfile::TempDir;

    fn test_store() -> (GraphStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();
        (store, dir)
    }

    /// Create a resume node with HAS_SKILL edges, the way the external
    /// resume-ingestion path persists them (values stored verbatim, possibly
    /// comma-joined).
    fn add_resume(store: &GraphStore, id: &str, skill_values: &[&str]) {
        let resume = store
            .merge_node_with_props(
                NodeLabel::Resume,
                id,
                &serde_json::json!({"name": "Test", "email": "test@example.com"}),
            )
            .unwrap();
        for value in skill_values {
            let skill = store.merge_node(NodeLabel::Skill, value).unwrap();
            store.merge_edge(resume, skill, EdgeType::HasSkill).unwrap();
        }
    }

    fn add_job(store: &GraphStore, id: &str, title: &str, skills: &[&str]) {
        let record = JobRecord {
            job_id: Some(id.into()),
            job_title: Some(title.into()),
            company: Some("Acme".into()),
            location: Some("Berlin".into()),
            employment_type: Some("Full-time".into()),
            skills_required: skills.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        JobIngester::new(store).ingest(&record).unwrap();
    }

    #[test]
    fn test_unknown_resume_is_not_found() {
        let (store, _dir) = test_store();
        let result = SkillMatcher::match_jobs(&store, "missing", 5);
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_limit_zero_returns_empty() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python"]);
        add_job(&store, "job-1", "Engineer", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 0).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_resume_without_skills_matches_nothing() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &[]);
        add_job(&store, "job-1", "Engineer", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 5).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn test_overlap_coverage_and_ordering() {
        // Resume skills stored as a comma-joined value plus a plain one.
        // Job A overlaps on 2 of 3 skills; Job B on 1 of 1. Overlap wins
        // over coverage, so A ranks first despite B's perfect coverage.
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python, SQL", "Docker"]);
        add_job(&store, "job-a", "Job A", &["Python", "SQL", "Go"]);
        add_job(&store, "job-b", "Job B", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 2).unwrap();
        assert_eq!(matches.len(), 2);

        let a = &matches[0];
        assert_eq!(a.job_id, "job-a");
        assert_eq!(a.skill_overlap, 2);
        assert_eq!(a.total_required, 3);
        assert_eq!(a.coverage, 2.0 / 3.0);
        assert_eq!(a.matching_skills, vec!["Python", "SQL"]);
        assert_eq!(a.score, 2.0);

        let b = &matches[1];
        assert_eq!(b.job_id, "job-b");
        assert_eq!(b.skill_overlap, 1);
        assert_eq!(b.total_required, 1);
        assert_eq!(b.coverage, 1.0);
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["python"]);
        add_job(&store, "job-1", "Engineer", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 5).unwrap();
        assert_eq!(matches.len(), 1);
        // The matched name is reported with its stored casing.
        assert_eq!(matches[0].matching_skills, vec!["Python"]);
    }

    #[test]
    fn test_title_breaks_ties() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python"]);
        add_job(&store, "job-b", "Beta Engineer", &["Python", "Go"]);
        add_job(&store, "job-a", "Alpha Engineer", &["Python", "Rust"]);

        // Equal overlap (1) and equal coverage (0.5): title decides.
        let matches = SkillMatcher::match_jobs(&store, "res-1", 5).unwrap();
        assert_eq!(matches[0].title, "Alpha Engineer");
        assert_eq!(matches[1].title, "Beta Engineer");
    }

    #[test]
    fn test_ranking_is_deterministic() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python, SQL", "Docker"]);
        add_job(&store, "job-a", "Job A", &["Python", "SQL", "Go"]);
        add_job(&store, "job-b", "Job B", &["Python", "Docker"]);
        add_job(&store, "job-c", "Job C", &["Docker"]);

        let first = SkillMatcher::match_jobs(&store, "res-1", 10).unwrap();
        let second = SkillMatcher::match_jobs(&store, "res-1", 10).unwrap();
        let ids = |ms: &[ScoredJob]| ms.iter().map(|m| m.job_id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_limit_truncates() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python"]);
        add_job(&store, "job-a", "A", &["Python"]);
        add_job(&store, "job-b", "B", &["Python"]);
        add_job(&store, "job-c", "C", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 2).unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].title, "A");
        assert_eq!(matches[1].title, "B");
    }

    #[test]
    fn test_jobs_without_required_skills_never_match() {
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python"]);
        add_job(&store, "job-a", "Has Skills", &["Python"]);
        add_job(&store, "job-b", "No Skills", &[]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 10).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].job_id, "job-a");
    }

    #[test]
    fn test_duplicate_tokens_count_once() {
        // "Python" appears twice across the resume's stored values; the
        // overlap against a job requiring Python is still 1.
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python, python", "PYTHON"]);
        add_job(&store, "job-1", "Engineer", &["Python"]);

        let matches = SkillMatcher::match_jobs(&store, "res-1", 5).unwrap();
        assert_eq!(matches[0].skill_overlap, 1);
    }

    #[test]
    fn test_sentinels_for_missing_company_location_and_type() {
        // A job merged without POSTS/LOCATED_AT edges or an employment type
        // (not producible via the ingester, but legal graph state).
        let (store, _dir) = test_store();
        add_resume(&store, "res-1", &["Python"]);

        let job = store
            .merge_node_with_props(
                NodeLabel::Job,
                "bare-job",
                &serde_json::json!({"title": "Bare Job"}),
            )
            .unwrap();
        let skill = store.merge_node(NodeLabel::Skill, "Python").unwrap();
        store.merge_edge(job, skill, EdgeType::RequiresSkill).unwrap();

        let matches = SkillMatcher::match_jobs(&store, "res-1", 5).unwrap();
        assert_eq!(matches[0].company, "Unknown");
        assert_eq!(matches[0].location, "Unknown");
        assert_eq!(matches[0].employment_type, "Not specified");
    }
}
