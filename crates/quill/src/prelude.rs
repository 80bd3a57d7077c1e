//! Quill Prelude
//!
//! Import this to get all commonly used types and traits:
//!
//! ```
//! use quill::prelude::*;
//! ```

// Core types
pub use crate::{actions, AuditEvent, EpochSecs, QuillError, Result, TenantId};

// Configs
pub use crate::{BackendKind, FileLogConfig, SqliteConfig, StoreConfig, SynchronousMode};

// Traits
pub use crate::AuditLog;

// Stores
pub use crate::{AuditRegistry, AuditStore, FileAuditLog, SqliteAuditLog};

// Recording
pub use crate::AuditRecorder;

// Middleware
pub use crate::{ActionMap, AuditContext, AuditLayer, RequestAuditor, RequestInfo};

// Re-export common external deps
pub use serde_json;
pub use std::sync::Arc;
pub use tracing;
