//! SQLite Read Connection Pool
//!
//! Provides a pool of read-only SQLite connections for concurrent reads.
//! SQLite requires separate connections for true concurrency; with WAL
//! enabled these readers do not block, and are not blocked by, the writer.

use parking_lot::{Mutex, MutexGuard};
use quill_core::error::{QuillError, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// A pooled read-only connection
///
/// The slot is released back to the pool when this is dropped.
pub struct PooledSqliteConnection<'a> {
    slot: MutexGuard<'a, Option<Connection>>,
}

impl<'a> PooledSqliteConnection<'a> {
    /// The underlying connection, or an error once the pool is closed
    pub fn connection(&self) -> Result<&Connection> {
        self.slot
            .as_ref()
            .ok_or_else(|| QuillError::StorageUnavailable("store is closed".into()))
    }
}

/// SQLite Read Connection Pool
///
/// Each connection is opened with `SQLITE_OPEN_READ_ONLY`. Acquisition takes
/// the first idle slot, starting from a rotating offset, and blocks on one
/// slot only when every connection is busy.
pub struct SqliteReadPool {
    connections: Vec<Mutex<Option<Connection>>>,
    next: AtomicUsize,
}

impl SqliteReadPool {
    /// Open `pool_size` read-only connections to an existing database
    pub fn open(db_path: &Path, pool_size: usize, busy_timeout: Duration) -> Result<Self> {
        let mut connections = Vec::with_capacity(pool_size);

        for _ in 0..pool_size {
            let conn = Connection::open_with_flags(
                db_path,
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .map_err(|e| QuillError::unavailable("failed to open read connection", e))?;
            conn.busy_timeout(busy_timeout)
                .map_err(|e| QuillError::unavailable("failed to configure read connection", e))?;

            connections.push(Mutex::new(Some(conn)));
        }

        Ok(Self {
            connections,
            next: AtomicUsize::new(0),
        })
    }

    /// A pool with no connections; reads fall back to the caller's connection
    pub fn disabled() -> Self {
        Self {
            connections: Vec::new(),
            next: AtomicUsize::new(0),
        }
    }

    /// Acquire a read connection, or `None` when the pool is disabled
    pub fn acquire(&self) -> Option<PooledSqliteConnection<'_>> {
        let size = self.connections.len();
        if size == 0 {
            return None;
        }

        let offset = self.next.fetch_add(1, Ordering::Relaxed) % size;
        for i in 0..size {
            if let Some(slot) = self.connections[(offset + i) % size].try_lock() {
                return Some(PooledSqliteConnection { slot });
            }
        }

        Some(PooledSqliteConnection {
            slot: self.connections[offset].lock(),
        })
    }

    /// Close every connection. In-flight reads finish first.
    pub fn close(&self) -> Result<()> {
        let mut first_err = None;
        for slot in &self.connections {
            if let Some(conn) = slot.lock().take() {
                if let Err((_, e)) = conn.close() {
                    first_err.get_or_insert(e);
                }
            }
        }
        match first_err {
            Some(e) => Err(QuillError::unavailable("failed to close read connection", e)),
            None => Ok(()),
        }
    }

    /// Get the pool size
    pub fn pool_size(&self) -> usize {
        self.connections.len()
    }
}
