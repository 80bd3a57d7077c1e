//! SQLite-backed audit log implementation
//!
//! Stores audit events as rows of an indexed table for efficient tenant and
//! time-range lookups.
//!
//! Key features:
//! - Compound index on `(tenant_id, occurred_at)`
//! - WAL mode so reads do not wait on writes
//! - Read-only connection pool for concurrent queries
//! - Metadata stored as JSON text, decoded back to structured values on read

pub mod read_pool;
pub mod schema;
pub mod store;

pub use read_pool::SqliteReadPool;
pub use store::SqliteAuditLog;
