//! Graph ingestion engine: job record → node and edge upserts.

use tracing::{info, warn};
use uuid::Uuid;

use jobgraph_core::normalize::normalize;
use jobgraph_core::Result;
use jobgraph_store::{EdgeType, GraphStore, NodeLabel};

use crate::record::JobRecord;

/// Sentinel for a job record with no usable title.
pub const UNTITLED_ROLE: &str = "Untitled Role";
/// Sentinel for a job record with no usable company.
pub const UNKNOWN_COMPANY: &str = "Unknown Company";
/// Sentinel for a job record with no usable location.
pub const UNKNOWN_LOCATION: &str = "Unknown";
/// Sentinel for the remaining missing scalar fields.
pub const NOT_SPECIFIED: &str = "Not specified";

/// Upserts a job record and all of its attribute nodes/edges, idempotently.
pub struct JobIngester<'a> {
    store: &'a GraphStore,
}

impl<'a> JobIngester<'a> {
    pub fn new(store: &'a GraphStore) -> Self {
        Self { store }
    }

    /// Ingest one job record. Returns the job id (generated when absent).
    ///
    /// Missing optional fields never fail the call: scalars fall back to
    /// sentinel values (logged), empty list entries are skipped. The only
    /// failure mode is a store error.
    pub fn ingest(&self, record: &JobRecord) -> Result<String> {
        let job_id = record
            .job_id
            .as_deref()
            .and_then(normalize)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let title = scalar_or(&job_id, "job_title", record.job_title.as_deref(), UNTITLED_ROLE);
        let employment_type = scalar_or(
            &job_id,
            "employment_type",
            record.employment_type.as_deref(),
            NOT_SPECIFIED,
        );
        let experience_required = scalar_or(
            &job_id,
            "experience_required",
            record.experience_required.as_deref(),
            NOT_SPECIFIED,
        );
        let salary_range = scalar_or(
            &job_id,
            "salary_range",
            record.salary_range.as_deref(),
            NOT_SPECIFIED,
        );

        // Scalars are written in the same statement that merges the Job node,
        // and overwrite whatever a previous ingestion stored.
        let job = self.store.merge_node_with_props(
            NodeLabel::Job,
            &job_id,
            &serde_json::json!({
                "title": title,
                "employment_type": employment_type,
                "experience_required": experience_required,
                "salary_range": salary_range,
            }),
        )?;

        let company = scalar_or(&job_id, "company", record.company.as_deref(), UNKNOWN_COMPANY);
        let company_node = self.store.merge_node(NodeLabel::Company, &company)?;
        self.store.merge_edge(company_node, job, EdgeType::Posts)?;

        let location = scalar_or(&job_id, "location", record.location.as_deref(), UNKNOWN_LOCATION);
        let location_node = self.store.merge_node(NodeLabel::Location, &location)?;
        self.store.merge_edge(job, location_node, EdgeType::LocatedAt)?;

        let mut linked = 0;
        linked += self.link_all(
            job,
            &record.skills_required,
            NodeLabel::Skill,
            EdgeType::RequiresSkill,
        )?;
        linked += self.link_all(
            job,
            &record.certifications_required,
            NodeLabel::Certification,
            EdgeType::RequiresCert,
        )?;
        linked += self.link_all(
            job,
            &record.education_required,
            NodeLabel::Education,
            EdgeType::RequiresEdu,
        )?;
        linked += self.link_all(
            job,
            &record.tools_and_technologies,
            NodeLabel::Tool,
            EdgeType::UsesTool,
        )?;
        linked += self.link_all(
            job,
            &record.responsibilities,
            NodeLabel::Responsibility,
            EdgeType::HasResponsibility,
        )?;

        info!(
            "Ingested job {} '{}' with {} attribute edges",
            job_id, title, linked
        );
        Ok(job_id)
    }

    /// Upsert one node + edge per non-empty value. Empty or whitespace-only
    /// values are skipped entirely, so no empty-valued node ever exists.
    fn link_all(
        &self,
        job: i64,
        values: &[String],
        label: NodeLabel,
        edge: EdgeType,
    ) -> Result<usize> {
        let mut linked = 0;
        for value in values {
            let key = match normalize(value) {
                Some(k) => k,
                None => continue,
            };
            let node = self.store.merge_node(label, &key)?;
            self.store.merge_edge(job, node, edge)?;
            linked += 1;
        }
        Ok(linked)
    }
}

/// Resolve a scalar field, substituting `sentinel` when missing or blank.
/// Substitution is a logged warning, never an error.
fn scalar_or(job_id: &str, field: &str, value: Option<&str>, sentinel: &str) -> String {
    match value.and_then(normalize) {
        Some(v) => v,
        None => {
            warn!("job {}: missing {}, substituting '{}'", job_id, field, sentinel);
            sentinel.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jobgraph_store::GraphStore;
    use tempfile::TempDir;

    fn test_store() -> (GraphStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = GraphStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn sample_record() -> JobRecord {
        JobRecord {
            job_id: Some("job-1".into()),
            job_title: Some("Backend Engineer".into()),
            company: Some("Acme".into()),
            location: Some("Berlin".into()),
            employment_type: Some("Full-time".into()),
            experience_required: Some("3+ years".into()),
            salary_range: Some("€70k–€90k".into()),
            education_required: vec!["BSc Computer Science".into()],
            certifications_required: vec!["AWS SAA".into()],
            skills_required: vec!["Python".into(), "SQL".into()],
            tools_and_technologies: vec!["Docker".into()],
            responsibilities: vec!["Design APIs".into()],
        }
    }

    #[test]
    fn test_ingest_builds_full_graph() {
        let (store, _dir) = test_store();
        let id = JobIngester::new(&store).ingest(&sample_record()).unwrap();
        assert_eq!(id, "job-1");

        assert_eq!(store.count_nodes(Some(NodeLabel::Job)).unwrap(), 1);
        assert_eq!(store.count_nodes(Some(NodeLabel::Company)).unwrap(), 1);
        assert_eq!(store.count_nodes(Some(NodeLabel::Location)).unwrap(), 1);
        assert_eq!(store.count_nodes(Some(NodeLabel::Skill)).unwrap(), 2);
        assert_eq!(store.count_nodes(Some(NodeLabel::Tool)).unwrap(), 1);
        assert_eq!(store.count_edges(Some(EdgeType::Posts)).unwrap(), 1);
        assert_eq!(store.count_edges(Some(EdgeType::RequiresSkill)).unwrap(), 2);

        let job = store.node_id(NodeLabel::Job, "job-1").unwrap().unwrap();
        assert_eq!(store.job_company(job).unwrap().as_deref(), Some("Acme"));
        assert_eq!(store.job_location(job).unwrap().as_deref(), Some("Berlin"));
    }

    #[test]
    fn test_ingest_twice_is_idempotent() {
        let (store, _dir) = test_store();
        let ingester = JobIngester::new(&store);
        let record = sample_record();

        ingester.ingest(&record).unwrap();
        let nodes = store.count_nodes(None).unwrap();
        let edges = store.count_edges(None).unwrap();

        ingester.ingest(&record).unwrap();
        assert_eq!(store.count_nodes(None).unwrap(), nodes);
        assert_eq!(store.count_edges(None).unwrap(), edges);
    }

    #[test]
    fn test_reingest_overwrites_scalars() {
        let (store, _dir) = test_store();
        let ingester = JobIngester::new(&store);

        ingester.ingest(&sample_record()).unwrap();
        let mut updated = sample_record();
        updated.job_title = Some("Staff Engineer".into());
        ingester.ingest(&updated).unwrap();

        assert_eq!(store.count_nodes(Some(NodeLabel::Job)).unwrap(), 1);
        let job = store.node_id(NodeLabel::Job, "job-1").unwrap().unwrap();
        let props = store.node_props(job).unwrap().unwrap();
        assert_eq!(props["title"], "Staff Engineer");
    }

    #[test]
    fn test_blank_list_entries_are_skipped() {
        let (store, _dir) = test_store();
        let record = JobRecord {
            job_id: Some("job-1".into()),
            skills_required: vec!["".into(), "   ".into(), "Go".into()],
            ..Default::default()
        };
        JobIngester::new(&store).ingest(&record).unwrap();

        assert_eq!(store.count_nodes(Some(NodeLabel::Skill)).unwrap(), 1);
        let job = store.node_id(NodeLabel::Job, "job-1").unwrap().unwrap();
        assert_eq!(
            store.out_neighbor_keys(job, EdgeType::RequiresSkill).unwrap(),
            vec!["Go"]
        );
    }

    #[test]
    fn test_attribute_values_are_trimmed() {
        let (store, _dir) = test_store();
        let record = JobRecord {
            job_id: Some("job-1".into()),
            skills_required: vec!["  Go  ".into()],
            ..Default::default()
        };
        JobIngester::new(&store).ingest(&record).unwrap();

        assert!(store.node_id(NodeLabel::Skill, "Go").unwrap().is_some());
        assert!(store.node_id(NodeLabel::Skill, "  Go  ").unwrap().is_none());
    }

    #[test]
    fn test_attribute_dedup_across_jobs() {
        let (store, _dir) = test_store();
        let ingester = JobIngester::new(&store);

        for id in ["job-1", "job-2"] {
            let record = JobRecord {
                job_id: Some(id.into()),
                skills_required: vec!["Go".into()],
                ..Default::default()
            };
            ingester.ingest(&record).unwrap();
        }

        // One "Go" node, one incoming REQUIRES_SKILL edge per job.
        assert_eq!(store.count_nodes(Some(NodeLabel::Skill)).unwrap(), 1);
        assert_eq!(store.count_edges(Some(EdgeType::RequiresSkill)).unwrap(), 2);
    }

    #[test]
    fn test_missing_scalars_get_sentinels() {
        let (store, _dir) = test_store();
        let id = JobIngester::new(&store)
            .ingest(&JobRecord::default())
            .unwrap();

        let job = store.node_id(NodeLabel::Job, &id).unwrap().unwrap();
        let props = store.node_props(job).unwrap().unwrap();
        assert_eq!(props["title"], UNTITLED_ROLE);
        assert_eq!(props["employment_type"], NOT_SPECIFIED);
        assert_eq!(props["experience_required"], NOT_SPECIFIED);
        assert_eq!(props["salary_range"], NOT_SPECIFIED);

        assert_eq!(
            store.job_company(job).unwrap().as_deref(),
            Some(UNKNOWN_COMPANY)
        );
        assert_eq!(
            store.job_location(job).unwrap().as_deref(),
            Some(UNKNOWN_LOCATION)
        );
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let (store, _dir) = test_store();
        let ingester = JobIngester::new(&store);

        let a = ingester.ingest(&JobRecord::default()).unwrap();
        let b = ingester.ingest(&JobRecord::default()).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count_nodes(Some(NodeLabel::Job)).unwrap(), 2);
    }
}
