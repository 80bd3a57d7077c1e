use super::ActionMap;
use crate::{observe, AuditEvent, AuditRecorder, TenantId};
use http::header::USER_AGENT;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Who is acting and for which tenant
///
/// Set by the authentication layer, either passed straight to
/// [`RequestAuditor::observe`] or inserted into the request extensions ahead
/// of [`AuditLayer`](super::AuditLayer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditContext {
    /// `None` is recorded as `"unknown"`
    pub actor: Option<String>,
    pub tenant_id: TenantId,
}

impl AuditContext {
    pub fn new(actor: impl Into<String>, tenant_id: TenantId) -> Self {
        Self {
            actor: Some(actor.into()),
            tenant_id,
        }
    }

    pub fn anonymous(tenant_id: TenantId) -> Self {
        Self {
            actor: None,
            tenant_id,
        }
    }
}

/// The parts of an inbound request that end up in the audit record
#[derive(Debug, Clone, Default)]
pub struct RequestInfo {
    pub method: String,
    pub path: String,
    /// Full request URI as received, including the query string
    pub uri: String,
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestInfo {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            method: method.into(),
            uri: path.clone(),
            path,
            remote_addr: None,
            user_agent: None,
        }
    }

    /// Capture method, URI, user agent and peer address (a [`SocketAddr`]
    /// request extension, when the server provides one)
    pub fn from_request<B>(req: &http::Request<B>) -> Self {
        Self {
            method: req.method().as_str().to_string(),
            path: req.uri().path().to_string(),
            uri: req.uri().to_string(),
            remote_addr: req
                .extensions()
                .get::<SocketAddr>()
                .map(|addr| addr.to_string()),
            user_agent: req
                .headers()
                .get(USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        }
    }
}

/// Anything a handler returns that carries an HTTP status
pub trait ResponseStatus {
    fn status_code(&self) -> u16;
}

impl<B> ResponseStatus for http::Response<B> {
    fn status_code(&self) -> u16 {
        self.status().as_u16()
    }
}

impl ResponseStatus for http::StatusCode {
    fn status_code(&self) -> u16 {
        self.as_u16()
    }
}

impl<T: ResponseStatus, E> ResponseStatus for std::result::Result<T, E> {
    /// Handler errors are reported as 500
    fn status_code(&self) -> u16 {
        match self {
            Ok(response) => response.status_code(),
            Err(_) => 500,
        }
    }
}

/// Derives audit events from requests and submits them without ever failing
/// the request
#[derive(Clone)]
pub struct RequestAuditor {
    recorder: AuditRecorder,
    actions: Arc<ActionMap>,
}

impl RequestAuditor {
    pub fn new(recorder: AuditRecorder, actions: ActionMap) -> Self {
        Self {
            recorder,
            actions: Arc::new(actions),
        }
    }

    pub fn actions(&self) -> &ActionMap {
        &self.actions
    }

    /// Run `handler`, then record one event describing the request
    ///
    /// The handler's return value is passed through untouched.
    pub fn observe<T, F>(&self, context: &AuditContext, request: &RequestInfo, handler: F) -> T
    where
        T: ResponseStatus,
        F: FnOnce() -> T,
    {
        let started = Instant::now();
        let response = handler();
        let event = self.build_event(context, request, response.status_code(), started.elapsed());
        self.submit(&event);
        response
    }

    /// The event recorded for a completed request
    ///
    /// `occurred_at` is left at zero so the store stamps the completion time.
    pub fn build_event(
        &self,
        context: &AuditContext,
        request: &RequestInfo,
        status: u16,
        elapsed: Duration,
    ) -> AuditEvent {
        let action = self.actions.action_for(&request.method, &request.path);
        let actor = context.actor.as_deref().unwrap_or_default();

        AuditEvent::new(actor, action, 0, context.tenant_id)
            .with_detail(format!("Status: {}, Duration: {:?}", status, elapsed))
            .with_metadata(json!({
                "requestUri": request.uri,
                "remoteAddr": request.remote_addr,
                "userAgent": request.user_agent,
                "statusCode": status,
                "durationMs": duration_millis(elapsed),
            }))
    }

    /// Record `event`, logging instead of returning any failure
    pub fn submit(&self, event: &AuditEvent) {
        if let Err(e) = self.recorder.record_event(event) {
            observe::record_dropped_audit();
            tracing::error!(
                error = %e,
                actor = %event.actor,
                action = %event.action,
                tenant_id = event.tenant_id,
                "Failed to record audit event"
            );
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`
fn duration_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{actions, AuditRegistry, FileLogConfig, StoreConfig, UNKNOWN_ACTOR};
    use tempfile::TempDir;

    fn auditor(registry: Arc<AuditRegistry>) -> RequestAuditor {
        let map = ActionMap::from_pairs([
            ("POST /login", actions::USER_LOGIN),
            ("DELETE /api/indices/*", actions::INDEX_DELETE),
        ])
        .unwrap();
        RequestAuditor::new(AuditRecorder::new(registry), map)
    }

    fn file_registry(temp: &TempDir) -> Arc<AuditRegistry> {
        let registry = Arc::new(AuditRegistry::new());
        registry
            .initialize_with(StoreConfig::File(FileLogConfig::new(
                temp.path().join("audit.log"),
            )))
            .unwrap();
        registry
    }

    #[test]
    fn test_observe_records_mapped_action() {
        let temp = TempDir::new().unwrap();
        let registry = file_registry(&temp);
        let auditor = auditor(Arc::clone(&registry));

        let mut request = RequestInfo::new("DELETE", "/api/indices/logs-2023");
        request.uri = "/api/indices/logs-2023?force=true".into();
        request.remote_addr = Some("10.0.0.7:5511".into());

        let status = auditor.observe(&AuditContext::new("alice", 42), &request, || {
            http::StatusCode::NO_CONTENT
        });
        assert_eq!(status, http::StatusCode::NO_CONTENT);

        let events = AuditRecorder::new(registry).list(42, 0, 0).unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.actor, "alice");
        assert_eq!(event.action, actions::INDEX_DELETE);
        assert!(event.detail.as_deref().unwrap().starts_with("Status: 204, Duration: "));
        assert!(event.occurred_at > 0);

        let metadata = event.metadata.as_ref().unwrap();
        assert_eq!(metadata["requestUri"], "/api/indices/logs-2023?force=true");
        assert_eq!(metadata["remoteAddr"], "10.0.0.7:5511");
        assert_eq!(metadata["statusCode"], 204);
        assert!(metadata["userAgent"].is_null());
        assert!(metadata["durationMs"].is_u64());
    }

    #[test]
    fn test_unmapped_request_and_anonymous_actor() {
        let temp = TempDir::new().unwrap();
        let registry = file_registry(&temp);
        let auditor = auditor(Arc::clone(&registry));

        let request = RequestInfo::new("GET", "/health");
        let response: std::result::Result<http::StatusCode, ()> =
            auditor.observe(&AuditContext::anonymous(1), &request, || Err(()));
        assert!(response.is_err());

        let events = AuditRecorder::new(registry).list(1, 0, 0).unwrap();
        assert_eq!(events[0].actor, UNKNOWN_ACTOR);
        assert_eq!(events[0].action, "GET request to /health");
        assert_eq!(events[0].metadata.as_ref().unwrap()["statusCode"], 500);
    }

    #[test]
    fn test_audit_failure_does_not_fail_handler() {
        let auditor = auditor(Arc::new(AuditRegistry::new()));
        let request = RequestInfo::new("POST", "/login");

        let status = auditor.observe(&AuditContext::new("alice", 1), &request, || {
            http::StatusCode::OK
        });
        assert_eq!(status, http::StatusCode::OK);
    }

    #[test]
    fn test_duration_millis_saturates() {
        assert_eq!(duration_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_millis(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_request_info_from_http_request() {
        let mut req = http::Request::builder()
            .method("POST")
            .uri("/login?next=%2F")
            .header(USER_AGENT, "curl/8.0")
            .body(())
            .unwrap();
        req.extensions_mut()
            .insert("192.168.1.1:4000".parse::<SocketAddr>().unwrap());

        let info = RequestInfo::from_request(&req);
        assert_eq!(info.method, "POST");
        assert_eq!(info.path, "/login");
        assert_eq!(info.uri, "/login?next=%2F");
        assert_eq!(info.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(info.remote_addr.as_deref(), Some("192.168.1.1:4000"));
    }
}
