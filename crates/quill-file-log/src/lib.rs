//! File-based audit log implementation
//!
//! Provides an append-only audit log stored as JSON lines in a single file.
//!
//! Features:
//! - One self-contained JSON object per line
//! - Appends and queries serialized by a per-instance lock
//! - Full-file scan with tenant and time-range filter
//! - Unparsable lines are skipped, never failing a query
//!
//! Every query reads the whole file, so cost grows with total log size. This
//! backend suits modest volumes; use the SQLite backend for large logs.

mod store;

pub use store::FileAuditLog;
