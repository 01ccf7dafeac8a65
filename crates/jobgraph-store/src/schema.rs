//! Database schema SQL.
//!
//! The graph is two tables. Node identity is (label, key); edge identity is
//! (source, target, type). Both carry a UNIQUE constraint so every upsert is
//! a single MERGE-style statement.

pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS nodes (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    label TEXT NOT NULL,
    key TEXT NOT NULL,
    props_json TEXT,
    created_at INTEGER NOT NULL,
    UNIQUE (label, key)
);

CREATE TABLE IF NOT EXISTS edges (
    source_id INTEGER NOT NULL REFERENCES nodes(id),
    target_id INTEGER NOT NULL REFERENCES nodes(id),
    edge_type TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    UNIQUE (source_id, target_id, edge_type)
);

CREATE INDEX IF NOT EXISTS idx_nodes_label ON nodes(label);
CREATE INDEX IF NOT EXISTS idx_edges_source_type ON edges(source_id, edge_type);
CREATE INDEX IF NOT EXISTS idx_edges_target_type ON edges(target_id, edge_type);
"#;
