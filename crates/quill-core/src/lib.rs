//! Quill Core: Traits and types for the quill audit-event store
//!
//! This crate defines the abstractions shared by every storage backend:
//! - [`AuditEvent`]: the immutable record persisted and retrieved
//! - [`AuditLog`]: append + tenant/time-range query, implemented by the
//!   file-based and SQLite backends
//! - Backend configuration, parsed from a backend name and a flat key-value map
//! - The action catalog producers draw labels from

pub mod actions;
pub mod audit_log;
pub mod config;
pub mod error;
pub mod observe;
pub mod types;

pub use audit_log::AuditLog;
pub use config::{BackendKind, FileLogConfig, SqliteConfig, StoreConfig, SynchronousMode};
pub use error::{QuillError, Result};
pub use types::{AuditEvent, EpochSecs, TenantId, UNKNOWN_ACTOR};
