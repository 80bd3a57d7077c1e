mod event;

pub use event::{AuditEvent, EpochSecs, TenantId, UNKNOWN_ACTOR};
