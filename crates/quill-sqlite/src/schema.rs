use quill_core::error::{QuillError, Result};
use rusqlite::Connection;

/// Version stamped into `PRAGMA user_version` for databases created here
pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_EVENTS_TABLE: &str = "CREATE TABLE IF NOT EXISTS audit_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    actor TEXT NOT NULL,
    action TEXT NOT NULL,
    detail TEXT,
    occurred_at INTEGER NOT NULL,
    tenant_id INTEGER NOT NULL,
    metadata TEXT
)";

pub const CREATE_TENANT_TIME_INDEX: &str = "CREATE INDEX IF NOT EXISTS idx_audit_events_tenant_time
    ON audit_events (tenant_id, occurred_at)";

/// Create the events table and its (tenant_id, occurred_at) index if missing.
///
/// Refuses databases stamped with a newer schema version than this build
/// understands.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let version: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| QuillError::unavailable("failed to read schema version", e))?;

    if version > SCHEMA_VERSION {
        return Err(QuillError::StorageUnavailable(format!(
            "database schema version {} is newer than supported version {}",
            version, SCHEMA_VERSION
        )));
    }

    conn.execute(CREATE_EVENTS_TABLE, [])
        .map_err(|e| QuillError::unavailable("failed to create audit events table", e))?;
    conn.execute(CREATE_TENANT_TIME_INDEX, [])
        .map_err(|e| QuillError::unavailable("failed to create audit events index", e))?;

    if version < SCHEMA_VERSION {
        conn.pragma_update(None, "user_version", SCHEMA_VERSION)
            .map_err(|e| QuillError::unavailable("failed to stamp schema version", e))?;
    }

    Ok(())
}
