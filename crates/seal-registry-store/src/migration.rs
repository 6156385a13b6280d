//! Database schema migrations for SQLite.
//!
//! We use a simple versioned migration system. Each migration is a SQL string
//! that transforms the schema from version N to N+1.

use rusqlite::Connection;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Sequence row naming the document id counter.
pub(crate) const DOCUMENT_SEQUENCE: &str = "documents";

/// Sequence row naming the batch id counter.
pub(crate) const BATCH_SEQUENCE: &str = "batches";

/// Initialize or migrate the database schema.
///
/// Idempotent: running it against an up-to-date database is a no-op.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current > CURRENT_VERSION {
        return Err(StoreError::Migration(format!(
            "database schema version {current} is newer than supported version {CURRENT_VERSION}"
        )));
    }

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, crate::now_millis()],
            )?;
        }

        tx.commit()?;
        tracing::debug!(from = current, to = CURRENT_VERSION, "schema migrated");
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: Initial schema.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Sealed documents. Rows are never deleted.
        CREATE TABLE documents (
            id INTEGER PRIMARY KEY,           -- allocated from sequences('documents')
            content_hash BLOB NOT NULL,       -- 32 bytes
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category TEXT NOT NULL,
            signature BLOB NOT NULL,          -- 512 bytes
            merkle_root BLOB NOT NULL,        -- 32 bytes
            public_key BLOB NOT NULL,         -- 256 bytes
            owner TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'active',
            sealed_at INTEGER NOT NULL        -- Unix ms
        );

        -- Uniqueness index: one document per content hash
        CREATE TABLE content_index (
            content_hash BLOB PRIMARY KEY,
            document_id INTEGER NOT NULL REFERENCES documents(id)
        );

        -- Batches of documents sealed together
        CREATE TABLE batches (
            id INTEGER PRIMARY KEY,           -- allocated from sequences('batches')
            document_ids BLOB NOT NULL,       -- CBOR array of document ids
            status TEXT NOT NULL,
            owner TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );

        -- Id counters. next_value is the id the next insert receives.
        CREATE TABLE sequences (
            name TEXT PRIMARY KEY,
            next_value INTEGER NOT NULL
        );

        INSERT INTO sequences (name, next_value) VALUES ('documents', 1);
        INSERT INTO sequences (name, next_value) VALUES ('batches', 1);

        CREATE INDEX idx_documents_owner ON documents(owner, id);
        "#,
    )?;

    Ok(())
}
