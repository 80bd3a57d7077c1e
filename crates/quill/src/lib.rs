//! Quill: a pluggable audit-event store
//!
//! Quill records user and administrative actions as structured audit events
//! and retrieves them by tenant and time window. It provides:
//! - **File backend**: append-only JSON lines, full-scan reads
//! - **Relational backend**: indexed SQLite table
//! - **Registry**: holds the one active backend, swapped wholesale on re-init
//! - **Recorder**: record/list façade over the active backend
//! - **Middleware**: derives events from HTTP requests without ever failing them
//!
//! # Quick Start
//!
//! ```no_run
//! use quill::prelude::*;
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<()> {
//! let registry = Arc::new(AuditRegistry::new());
//! let mut settings = HashMap::new();
//! settings.insert("filePath".to_string(), "audit.log".to_string());
//! registry.initialize("file", &settings)?;
//!
//! let recorder = AuditRecorder::new(registry);
//! recorder.record("alice", actions::USER_LOGIN, Some("Login from 192.168.1.1"), 0, 123, None)?;
//!
//! for event in recorder.list(123, 0, 0)? {
//!     println!("{} {} {}", event.occurred_at, event.actor, event.action);
//! }
//! # Ok(())
//! # }
//! ```

pub mod middleware;
pub mod prelude;
pub mod recorder;
pub mod registry;
pub mod store;

// Re-export core types
pub use quill_core::{
    actions,
    config::{BackendKind, FileLogConfig, SqliteConfig, StoreConfig, SynchronousMode},
    error::{QuillError, Result},
    observe,
    types::{AuditEvent, EpochSecs, TenantId, UNKNOWN_ACTOR},
    AuditLog,
};

// Re-export implementations
pub use quill_file_log::FileAuditLog;
pub use quill_sqlite::SqliteAuditLog;

// Re-export main types from this crate
pub use middleware::{ActionMap, AuditContext, AuditLayer, RequestAuditor, RequestInfo};
pub use recorder::AuditRecorder;
pub use registry::AuditRegistry;
pub use store::AuditStore;
