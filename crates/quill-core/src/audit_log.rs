//! Audit log trait
//!
//! Defines the interface every storage backend (file-based, SQLite) implements.

use crate::error::Result;
use crate::types::{AuditEvent, EpochSecs, TenantId};

/// Audit event storage backend
///
/// Backends are append-only: there is no update or delete of individual
/// records. Both operations block until the backend has finished.
pub trait AuditLog: Send + Sync {
    /// Short name used in logs and metrics labels
    fn backend_name(&self) -> &'static str;

    /// Persist one event.
    ///
    /// A zero `occurred_at` is replaced with the current time. The event is on
    /// stable storage when this returns `Ok`.
    fn append(&self, event: &AuditEvent) -> Result<()>;

    /// Events of `tenant_id` with `start <= occurred_at <= end`, ascending by
    /// `occurred_at`.
    ///
    /// `end == 0` means no upper bound.
    fn query(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs)
        -> Result<Vec<AuditEvent>>;
}
