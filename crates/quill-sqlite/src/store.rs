use parking_lot::Mutex;
use quill_core::{
    error::{QuillError, Result},
    observe, AuditEvent, AuditLog, EpochSecs, SqliteConfig, TenantId,
};
use rusqlite::{params, params_from_iter, Connection, OpenFlags};
use serde_json::Value;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::read_pool::SqliteReadPool;
use crate::schema;

const BACKEND: &str = "sqlite";

const INSERT_EVENT: &str = "INSERT INTO audit_events
    (actor, action, detail, occurred_at, tenant_id, metadata)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

const SELECT_EVENTS: &str = "SELECT actor, action, detail, occurred_at, tenant_id, metadata
    FROM audit_events
    WHERE tenant_id = ?1 AND occurred_at >= ?2";

/// SQLite-backed audit log
///
/// Rows live in `audit_events`, indexed on `(tenant_id, occurred_at)`. Writes
/// go through a single connection and are serialized by SQLite; queries use a
/// pool of read-only connections when one is configured.
pub struct SqliteAuditLog {
    writer: Mutex<Option<Connection>>,
    readers: SqliteReadPool,
    config: SqliteConfig,
}

/// Row as stored, before metadata is decoded
struct StoredRow {
    actor: String,
    action: String,
    detail: Option<String>,
    occurred_at: i64,
    tenant_id: i64,
    metadata: Option<String>,
}

impl SqliteAuditLog {
    /// Open or create the database at `cfg.path` and ensure the schema exists
    pub fn open(cfg: SqliteConfig) -> Result<Self> {
        let in_memory = cfg.path.as_os_str() == ":memory:";

        // Create parent directory if needed
        if !in_memory {
            if let Some(parent) = cfg.path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        QuillError::unavailable(
                            &format!("failed to create directory {}", parent.display()),
                            e,
                        )
                    })?;
                }
            }
        }

        let conn = Connection::open_with_flags(
            &cfg.path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(|e| {
            QuillError::unavailable(
                &format!("failed to open database {}", cfg.path.display()),
                e,
            )
        })?;

        Self::configure_connection(&conn, &cfg)?;
        schema::init_schema(&conn)?;

        // Separate read-only connections cannot see an in-memory database.
        let readers = if in_memory || cfg.read_pool_size == 0 {
            SqliteReadPool::disabled()
        } else {
            SqliteReadPool::open(
                &cfg.path,
                cfg.read_pool_size,
                Duration::from_millis(cfg.busy_timeout_ms),
            )?
        };

        tracing::info!(
            path = %cfg.path.display(),
            wal = cfg.wal_mode,
            read_connections = readers.pool_size(),
            "Opened SQLite audit log"
        );

        Ok(Self {
            writer: Mutex::new(Some(conn)),
            readers,
            config: cfg,
        })
    }

    /// Configure SQLite connection
    fn configure_connection(conn: &Connection, cfg: &SqliteConfig) -> Result<()> {
        if cfg.wal_mode {
            let mode: String = conn
                .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
                .map_err(|e| QuillError::unavailable("failed to enable WAL", e))?;
            if !mode.eq_ignore_ascii_case("wal") {
                tracing::debug!(journal_mode = %mode, "WAL not available for this database");
            }
        }

        conn.pragma_update(None, "synchronous", cfg.synchronous.as_pragma())
            .map_err(|e| QuillError::unavailable("failed to set synchronous mode", e))?;

        conn.busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))
            .map_err(|e| QuillError::unavailable("failed to set busy timeout", e))?;

        Ok(())
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Release every connection.
    ///
    /// Later calls fail with `StorageUnavailable`; closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        let writer = self.writer.lock().take();
        let write_result = match writer {
            Some(conn) => conn
                .close()
                .map_err(|(_, e)| QuillError::unavailable("failed to close database", e)),
            None => Ok(()),
        };
        let read_result = self.readers.close();

        tracing::info!(path = %self.config.path.display(), "Closed SQLite audit log");
        write_result.and(read_result)
    }

    fn insert(&self, event: &AuditEvent) -> Result<()> {
        let metadata = event
            .metadata
            .as_ref()
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| QuillError::write("failed to serialize metadata", e))?;

        let guard = self.writer.lock();
        let conn = guard
            .as_ref()
            .ok_or_else(|| QuillError::StorageUnavailable("store is closed".into()))?;

        conn.execute(
            INSERT_EVENT,
            params![
                event.actor,
                event.action,
                event.detail,
                event.occurred_at,
                event.tenant_id,
                metadata,
            ],
        )
        .map_err(|e| QuillError::write("failed to insert audit event", e))?;

        Ok(())
    }

    fn select(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        match self.readers.acquire() {
            Some(pooled) => run_select(pooled.connection()?, tenant_id, start, end),
            None => {
                let guard = self.writer.lock();
                let conn = guard
                    .as_ref()
                    .ok_or_else(|| QuillError::StorageUnavailable("store is closed".into()))?;
                run_select(conn, tenant_id, start, end)
            }
        }
    }
}

fn run_select(
    conn: &Connection,
    tenant_id: TenantId,
    start: EpochSecs,
    end: EpochSecs,
) -> Result<Vec<AuditEvent>> {
    let mut sql = String::from(SELECT_EVENTS);
    let mut args = vec![tenant_id, start];
    if end > 0 {
        sql.push_str(" AND occurred_at <= ?3");
        args.push(end);
    }
    sql.push_str(" ORDER BY occurred_at ASC, id ASC");

    let mut stmt = conn
        .prepare_cached(&sql)
        .map_err(|e| QuillError::read("failed to prepare audit query", e))?;

    let rows = stmt
        .query_map(params_from_iter(args.iter()), |row| {
            Ok(StoredRow {
                actor: row.get(0)?,
                action: row.get(1)?,
                detail: row.get(2)?,
                occurred_at: row.get(3)?,
                tenant_id: row.get(4)?,
                metadata: row.get(5)?,
            })
        })
        .map_err(|e| QuillError::read("failed to query audit events", e))?;

    let mut events = Vec::new();
    for row in rows {
        let row = row.map_err(|e| QuillError::read("failed to read audit event row", e))?;
        events.push(row.into_event());
    }
    Ok(events)
}

impl StoredRow {
    /// Undecodable or `null` metadata becomes `None`; the row itself is kept.
    fn into_event(self) -> AuditEvent {
        let metadata = match self.metadata.as_deref() {
            None | Some("") => None,
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(Value::Null) => None,
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::warn!(
                        tenant_id = self.tenant_id,
                        occurred_at = self.occurred_at,
                        error = %e,
                        "Dropping undecodable audit metadata"
                    );
                    observe::record_parse_skip(BACKEND);
                    None
                }
            },
        };

        AuditEvent {
            actor: self.actor,
            action: self.action,
            detail: self.detail,
            occurred_at: self.occurred_at,
            tenant_id: self.tenant_id,
            metadata,
        }
    }
}

impl AuditLog for SqliteAuditLog {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn append(&self, event: &AuditEvent) -> Result<()> {
        let started = Instant::now();
        let result = self.insert(&event.stamped());
        observe::record_append(BACKEND, started.elapsed(), result.is_ok());
        result
    }

    fn query(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        let started = Instant::now();
        let result = self.select(tenant_id, start, end);
        observe::record_query(
            BACKEND,
            started.elapsed(),
            result.as_ref().ok().map(Vec::len),
        );
        result
    }
}
