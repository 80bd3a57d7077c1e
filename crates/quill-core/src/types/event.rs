use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tenant (organization) identifier
pub type TenantId = i64;

/// Seconds since the Unix epoch
pub type EpochSecs = i64;

/// Actor recorded when the acting principal is not known
pub const UNKNOWN_ACTOR: &str = "unknown";

/// One audited action occurrence.
///
/// Records are immutable once written. The serialized form is the on-disk
/// format of the file backend, one object per line. Legacy field names are
/// accepted on read so older logs stay queryable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Acting principal
    #[serde(alias = "username")]
    pub actor: String,

    /// Label from the action catalog
    #[serde(alias = "actionString")]
    pub action: String,

    /// Free-form description
    #[serde(
        default,
        alias = "extraMsg",
        skip_serializing_if = "Option::is_none"
    )]
    pub detail: Option<String>,

    /// When the action happened; zero means "now" at append time
    #[serde(alias = "epochTimestampSec")]
    pub occurred_at: EpochSecs,

    /// Owning tenant
    #[serde(alias = "orgId")]
    pub tenant_id: TenantId,

    /// Arbitrary structured payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl AuditEvent {
    /// Create an event with no detail or metadata.
    ///
    /// An empty actor is replaced with [`UNKNOWN_ACTOR`].
    pub fn new(
        actor: impl Into<String>,
        action: impl Into<String>,
        occurred_at: EpochSecs,
        tenant_id: TenantId,
    ) -> Self {
        let actor = actor.into();
        Self {
            actor: if actor.is_empty() {
                UNKNOWN_ACTOR.to_string()
            } else {
                actor
            },
            action: action.into(),
            detail: None,
            occurred_at,
            tenant_id,
            metadata: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// JSON `null` is treated as no metadata.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata).filter(|v| !v.is_null());
        self
    }

    /// Copy of this event as it is persisted: a zero timestamp is replaced
    /// by the current time and `null` metadata is dropped.
    pub fn stamped(&self) -> Self {
        let mut event = self.clone();
        if event.occurred_at == 0 {
            event.occurred_at = chrono::Utc::now().timestamp();
        }
        if matches!(event.metadata, Some(Value::Null)) {
            event.metadata = None;
        }
        event
    }

    /// Tenant and time-window filter shared by every backend.
    ///
    /// Both bounds are inclusive; `end == 0` means no upper bound.
    pub fn matches(&self, tenant_id: TenantId, start: EpochSecs, end: EpochSecs) -> bool {
        self.tenant_id == tenant_id
            && self.occurred_at >= start
            && (end == 0 || self.occurred_at <= end)
    }
}
