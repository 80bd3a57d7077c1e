//! Recording façade
//!
//! Thin entry points that resolve the active store through the registry and
//! delegate to it. Every call fails with [`QuillError::NotInitialized`] until
//! the registry has a store.
//!
//! [`QuillError::NotInitialized`]: crate::QuillError::NotInitialized

use crate::{AuditEvent, AuditLog, AuditRegistry, EpochSecs, Result, TenantId};
use serde_json::Value;
use std::sync::Arc;

/// Record and list audit events against the registry's active store
#[derive(Clone)]
pub struct AuditRecorder {
    registry: Arc<AuditRegistry>,
}

impl AuditRecorder {
    pub fn new(registry: Arc<AuditRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<AuditRegistry> {
        &self.registry
    }

    /// Record one event
    ///
    /// An empty `actor` is stored as `"unknown"`; `occurred_at == 0` is
    /// replaced with the current time by the store.
    pub fn record(
        &self,
        actor: &str,
        action: &str,
        detail: Option<&str>,
        occurred_at: EpochSecs,
        tenant_id: TenantId,
        metadata: Option<Value>,
    ) -> Result<()> {
        let mut event = AuditEvent::new(actor, action, occurred_at, tenant_id);
        event.detail = detail.map(str::to_string);
        event.metadata = metadata;
        self.record_event(&event)
    }

    /// Record a prebuilt event
    pub fn record_event(&self, event: &AuditEvent) -> Result<()> {
        self.registry.current()?.append(event)
    }

    /// Events of `tenant_id` within `[start, end]`, oldest first; `end == 0`
    /// means no upper bound
    pub fn list(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> Result<Vec<AuditEvent>> {
        self.registry.current()?.query(tenant_id, start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions, QuillError};
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_not_initialized_is_uniform() {
        let recorder = AuditRecorder::new(Arc::new(AuditRegistry::new()));

        let err = recorder
            .record("alice", actions::USER_LOGIN, None, 10, 1, None)
            .unwrap_err();
        assert!(matches!(err, QuillError::NotInitialized));
        assert!(matches!(
            recorder.list(1, 0, 0),
            Err(QuillError::NotInitialized)
        ));
    }

    #[test]
    fn test_record_and_list() {
        let temp = TempDir::new().unwrap();
        let registry = Arc::new(AuditRegistry::new());
        let mut settings = HashMap::new();
        settings.insert(
            "filePath".to_string(),
            temp.path().join("audit.log").display().to_string(),
        );
        registry.initialize("file", &settings).unwrap();

        let recorder = AuditRecorder::new(Arc::clone(&registry));
        recorder
            .record("", actions::USER_LOGOUT, Some("bye"), 50, 3, None)
            .unwrap();

        let events = recorder.list(3, 0, 0).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].actor, crate::UNKNOWN_ACTOR);
        assert_eq!(events[0].detail.as_deref(), Some("bye"));
    }
}
