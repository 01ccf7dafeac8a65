//! SQLite-backed labeled property graph store.
//!
//! Upserts follow the MERGE-by-natural-key pattern: get-or-create a node
//! keyed by (label, key), get-or-create an edge keyed by (source, target,
//! type). Each upsert is a single statement, so a concurrent reader never
//! observes a Job node without its scalar properties; edges created later in
//! the same ingestion call may become visible one at a time.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;

use crate::schema::SCHEMA_SQL;
use crate::types::*;
use jobgraph_core::{Error, Result};

/// Graph store over a single SQLite connection.
pub struct GraphStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl GraphStore {
    /// Open or create the graph store.
    ///
    /// `db_dir` is the directory (e.g., `data/graphdb/`). The file will be
    /// `db_dir/jobgraph.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir).map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        let db_path = db_dir.join("jobgraph.db");

        let conn = Self::create_connection(&db_path)?;
        Self::init_schema(&conn)?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let node_count = store.count_nodes(None)?;
        let edge_count = store.count_edges(None)?;
        info!(
            "GraphStore initialized: {} nodes, {} edges, path={}",
            node_count,
            edge_count,
            store.db_path.display()
        );

        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn =
            Connection::open(db_path).map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::StoreUnavailable(e.to_string()))?;
        Ok(conn)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Upserts
    // ---------------------------------------------------------------

    /// Get-or-create a node by (label, key). Returns the node id.
    pub fn merge_node(&self, label: NodeLabel, key: &str) -> Result<i64> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO nodes (label, key, created_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT(label, key) DO NOTHING",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![label.as_str(), key, now_ms()])
        .map_err(|e| Error::Database(e.to_string()))?;

        Self::node_id_locked(&conn, label, key)?
            .ok_or_else(|| Error::Internal(format!("merged node vanished: {}", key)))
    }

    /// Get-or-create a node and set its properties unconditionally.
    ///
    /// Re-merging an existing node overwrites its properties (last-write-wins,
    /// no field-level merge of old vs new values).
    pub fn merge_node_with_props(
        &self,
        label: NodeLabel,
        key: &str,
        props: &serde_json::Value,
    ) -> Result<i64> {
        let props_json = serde_json::to_string(props)?;
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO nodes (label, key, props_json, created_at) VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(label, key) DO UPDATE SET props_json = excluded.props_json",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![label.as_str(), key, props_json, now_ms()])
        .map_err(|e| Error::Database(e.to_string()))?;

        Self::node_id_locked(&conn, label, key)?
            .ok_or_else(|| Error::Internal(format!("merged node vanished: {}", key)))
    }

    /// Get-or-create an edge keyed by (source, target, type).
    pub fn merge_edge(&self, source_id: i64, target_id: i64, edge: EdgeType) -> Result<()> {
        let conn = self.conn.lock();
        conn.prepare_cached(
            "INSERT INTO edges (source_id, target_id, edge_type, created_at) \
             VALUES (?1, ?2, ?3, ?4) \
             ON CONFLICT(source_id, target_id, edge_type) DO NOTHING",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![source_id, target_id, edge.as_str(), now_ms()])
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    // ---------------------------------------------------------------
    // Node lookups
    // ---------------------------------------------------------------

    /// Resolve a node id by (label, key).
    pub fn node_id(&self, label: NodeLabel, key: &str) -> Result<Option<i64>> {
        let conn = self.conn.lock();
        Self::node_id_locked(&conn, label, key)
    }

    fn node_id_locked(conn: &Connection, label: NodeLabel, key: &str) -> Result<Option<i64>> {
        conn.prepare_cached("SELECT id FROM nodes WHERE label = ?1 AND key = ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![label.as_str(), key], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Get a node's properties as JSON.
    pub fn node_props(&self, node_id: i64) -> Result<Option<serde_json::Value>> {
        let conn = self.conn.lock();
        let props_json: Option<Option<String>> = conn
            .prepare_cached("SELECT props_json FROM nodes WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![node_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(props_json
            .flatten()
            .and_then(|s| serde_json::from_str(&s).ok()))
    }

    /// Count nodes, optionally filtered by label.
    pub fn count_nodes(&self, label: Option<NodeLabel>) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = match label {
            Some(l) => conn
                .query_row(
                    "SELECT COUNT(*) FROM nodes WHERE label = ?1",
                    params![l.as_str()],
                    |row| row.get(0),
                )
                .map_err(|e| Error::Database(e.to_string()))?,
            None => conn
                .query_row("SELECT COUNT(*) FROM nodes", [], |row| row.get(0))
                .map_err(|e| Error::Database(e.to_string()))?,
        };
        Ok(count)
    }

    /// Count edges, optionally filtered by type.
    pub fn count_edges(&self, edge: Option<EdgeType>) -> Result<i64> {
        let conn = self.conn.lock();
        let count: i64 = match edge {
            Some(e) => conn
                .query_row(
                    "SELECT COUNT(*) FROM edges WHERE edge_type = ?1",
                    params![e.as_str()],
                    |row| row.get(0),
                )
                .map_err(|e| Error::Database(e.to_string()))?,
            None => conn
                .query_row("SELECT COUNT(*) FROM edges", [], |row| row.get(0))
                .map_err(|e| Error::Database(e.to_string()))?,
        };
        Ok(count)
    }

    // ---------------------------------------------------------------
    // Match-engine reads
    // ---------------------------------------------------------------

    /// Skill values attached to a resume via HAS_SKILL edges.
    ///
    /// Values are returned as stored; a single value may itself be a
    /// comma-joined list (callers split).
    pub fn resume_skill_values(&self, resume_node_id: i64) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT s.key FROM edges e \
                 JOIN nodes s ON s.id = e.target_id \
                 WHERE e.source_id = ?1 AND e.edge_type = 'HAS_SKILL' \
                 ORDER BY s.key",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![resume_node_id], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// All (job, required skill) pairs in the graph.
    pub fn requires_skill_pairs(&self) -> Result<Vec<JobSkillRow>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT j.id, j.key, j.props_json, s.key FROM edges e \
                 JOIN nodes j ON j.id = e.source_id \
                 JOIN nodes s ON s.id = e.target_id \
                 WHERE e.edge_type = 'REQUIRES_SKILL'",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                let props: Option<String> = row.get(2)?;
                Ok(JobSkillRow {
                    job_node_id: row.get(0)?,
                    job_id: row.get(1)?,
                    title: props
                        .as_deref()
                        .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok())
                        .and_then(|v| v["title"].as_str().map(String::from)),
                    skill: row.get(3)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<JobSkillRow>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// The posting company for a job, if any. At most one is returned.
    pub fn job_company(&self, job_node_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT c.key FROM edges e \
                 JOIN nodes c ON c.id = e.source_id \
                 WHERE e.target_id = ?1 AND e.edge_type = 'POSTS' \
                 ORDER BY c.key LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        stmt.query_row(params![job_node_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// The location of a job, if any. At most one is returned.
    pub fn job_location(&self, job_node_id: i64) -> Result<Option<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT l.key FROM edges e \
                 JOIN nodes l ON l.id = e.target_id \
                 WHERE e.source_id = ?1 AND e.edge_type = 'LOCATED_AT' \
                 ORDER BY l.key LIMIT 1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        stmt.query_row(params![job_node_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Query facade reads
    // ---------------------------------------------------------------

    /// List jobs with their employment type and location.
    ///
    /// Jobs without a LOCATED_AT edge are not listed, matching the upstream
    /// API behavior.
    pub fn list_jobs(&self, limit: usize) -> Result<Vec<JobListing>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT json_extract(j.props_json, '$.title'), \
                        json_extract(j.props_json, '$.employment_type'), \
                        l.key \
                 FROM nodes j \
                 JOIN edges e ON e.source_id = j.id AND e.edge_type = 'LOCATED_AT' \
                 JOIN nodes l ON l.id = e.target_id \
                 WHERE j.label = 'Job' \
                 ORDER BY json_extract(j.props_json, '$.title') \
                 LIMIT ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                Ok(JobListing {
                    title: row.get(0)?,
                    employment_type: row.get(1)?,
                    location: row.get(2)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<JobListing>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Find jobs whose required skill names contain `fragment`
    /// (case-insensitive substring).
    pub fn search_jobs_by_skill(&self, fragment: &str) -> Result<Vec<SkillSearchHit>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT json_extract(j.props_json, '$.title'), l.key, s.key \
                 FROM nodes s \
                 JOIN edges es ON es.target_id = s.id AND es.edge_type = 'REQUIRES_SKILL' \
                 JOIN nodes j ON j.id = es.source_id \
                 JOIN edges el ON el.source_id = j.id AND el.edge_type = 'LOCATED_AT' \
                 JOIN nodes l ON l.id = el.target_id \
                 WHERE s.label = 'Skill' AND instr(lower(s.key), lower(?1)) > 0 \
                 ORDER BY json_extract(j.props_json, '$.title'), s.key",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![fragment], |row| {
                Ok(SkillSearchHit {
                    title: row.get(0)?,
                    location: row.get(1)?,
                    skill_match: row.get(2)?,
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<SkillSearchHit>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Skills and tools for the first job whose title contains `fragment`
    /// (case-insensitive substring). `None` when no title matches.
    pub fn job_details(&self, fragment: &str) -> Result<Option<JobDetails>> {
        let job: Option<(i64, Option<String>)> = {
            let conn = self.conn.lock();
            let mut stmt = conn
                .prepare_cached(
                    "SELECT id, json_extract(props_json, '$.title') \
                     FROM nodes \
                     WHERE label = 'Job' \
                       AND instr(lower(json_extract(props_json, '$.title')), lower(?1)) > 0 \
                     ORDER BY json_extract(props_json, '$.title') LIMIT 1",
                )
                .map_err(|e| Error::Database(e.to_string()))?;
            stmt.query_row(params![fragment], |row| Ok((row.get(0)?, row.get(1)?)))
                .optional()
                .map_err(|e| Error::Database(e.to_string()))?
        };

        let (job_node_id, title) = match job {
            Some(j) => j,
            None => return Ok(None),
        };

        Ok(Some(JobDetails {
            title,
            skills: self.out_neighbor_keys(job_node_id, EdgeType::RequiresSkill)?,
            tools: self.out_neighbor_keys(job_node_id, EdgeType::UsesTool)?,
        }))
    }

    /// Keys of all nodes reachable from `source_id` over edges of `edge` type.
    pub fn out_neighbor_keys(&self, source_id: i64, edge: EdgeType) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT n.key FROM edges e \
                 JOIN nodes n ON n.id = e.target_id \
                 WHERE e.source_id = ?1 AND e.edge_type = ?2 \
                 ORDER BY n.key",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![source_id, edge.as_str()], |row| row.get(0))
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<String>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// List resume nodes (id, name, email).
    pub fn list_resumes(&self, limit: usize) -> Result<Vec<ResumeSummary>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT key, props_json FROM nodes WHERE label = 'Resume' \
                 ORDER BY key LIMIT ?1",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let id: String = row.get(0)?;
                let props: Option<String> = row.get(1)?;
                let props = props
                    .as_deref()
                    .and_then(|s| serde_json::from_str::<serde_json::Value>(s).ok());
                Ok(ResumeSummary {
                    id,
                    name: props
                        .as_ref()
                        .and_then(|v| v["name"].as_str().map(String::from)),
                    email: props
                        .as_ref()
                        .and_then(|v| v["email"].as_str().map(String::from)),
                })
            })
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.collect::<rusqlite::Result<Vec<ResumeSummary>>>()
            .map_err(|e| Error::Database(e.to_string()))
    }

    // ---------------------------------------------------------------
    // Stats
    // ---------------------------------------------------------------

    /// Get store statistics.
    pub fn stats(&self) -> Result<GraphStats> {
        let total_nodes = self.count_nodes(None)?;
        let total_edges = self.count_edges(None)?;
        let jobs = self.count_nodes(Some(NodeLabel::Job))?;
        let resumes = self.count_nodes(Some(NodeLabel::Resume))?;
        let skills = self.count_nodes(Some(NodeLabel::Skill))?;
        let companies = self.count_nodes(Some(NodeLabel::Company))?;

        let db_size = std::fs::metadata(&self.db_path)
            .map(|m| m.len())
            .unwrap_or(0);

        Ok(GraphStats {
            total_nodes,
            total_edges,
            jobs,
            resumes,
            skills,
            companies,
            db_path: self.db_path.to_string_lossy().to_string(),
            db_size_mb: db_size as f64 / (1024.0 * 1024.0),
        })
    }
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as i64
}
