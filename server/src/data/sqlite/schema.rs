//! SQLite schema definitions
//!
//! Complete schema at the current version. Fresh databases get this directly;
//! older databases are brought forward by the versioned migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Entities: one row per document, keyed by its canonical key path
-- =============================================================================
CREATE TABLE IF NOT EXISTS entities (
    key_path TEXT PRIMARY KEY,
    kind TEXT NOT NULL,
    parent_path TEXT,
    key_id INTEGER,
    key_name TEXT,
    body TEXT NOT NULL CHECK(json_valid(body)),
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL,
    CHECK ((key_id IS NULL) <> (key_name IS NULL))
);

CREATE INDEX IF NOT EXISTS idx_entities_kind ON entities(kind, key_id, key_name);
CREATE INDEX IF NOT EXISTS idx_entities_parent ON entities(parent_path, kind);

-- =============================================================================
-- 2. Id allocation: one counter per (kind, parent)
-- =============================================================================
CREATE TABLE IF NOT EXISTS id_allocations (
    kind TEXT NOT NULL,
    parent_path TEXT NOT NULL DEFAULT '',
    next_id INTEGER NOT NULL,
    PRIMARY KEY (kind, parent_path)
);
"#;
