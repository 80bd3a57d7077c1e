//! Tower layer that audits every request passing through it

use super::{AuditContext, RequestAuditor, RequestInfo};
use http::{Request, Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};

/// Layer producing [`AuditService`]
///
/// The wrapped service must run inside a tokio runtime: the audit write is
/// handed to `tokio::task::spawn_blocking`, which panics outside one.
#[derive(Clone)]
pub struct AuditLayer {
    auditor: Arc<RequestAuditor>,
}

impl AuditLayer {
    pub fn new(auditor: RequestAuditor) -> Self {
        Self {
            auditor: Arc::new(auditor),
        }
    }
}

impl<S> Layer<S> for AuditLayer {
    type Service = AuditService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuditService {
            inner,
            auditor: self.auditor.clone(),
        }
    }
}

/// Audit middleware service
///
/// Reads the [`AuditContext`] request extension, runs the inner service and
/// records one event once the response is ready. The store write runs on
/// tokio's blocking pool and the response is returned only after it
/// completes, so each response carries the write latency. The write's
/// outcome never changes the response. Requests
/// without an `AuditContext`, and inner-service errors, are passed through
/// without a record.
#[derive(Clone)]
pub struct AuditService<S> {
    inner: S,
    auditor: Arc<RequestAuditor>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for AuditService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future =
        Pin<Box<dyn Future<Output = std::result::Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let context = req.extensions().get::<AuditContext>().cloned();
        let info = RequestInfo::from_request(&req);
        let auditor = self.auditor.clone();

        // Keep the service that was polled ready; leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let started = Instant::now();
            let result = inner.call(req).await;
            let elapsed = started.elapsed();

            let Some(context) = context else {
                tracing::warn!(
                    method = %info.method,
                    path = %info.path,
                    "Request has no audit context, skipping audit record"
                );
                return result;
            };

            let status = result.as_ref().ok().map(|response| response.status().as_u16());
            match status {
                Some(status) => {
                    let event = auditor.build_event(&context, &info, status, elapsed);
                    let submitted =
                        tokio::task::spawn_blocking(move || auditor.submit(&event)).await;
                    if let Err(e) = submitted {
                        tracing::error!(error = %e, "Audit write task failed");
                    }
                }
                None => {
                    tracing::debug!(
                        method = %info.method,
                        path = %info.path,
                        "Inner service failed, no audit record"
                    );
                }
            }

            result
        })
    }
}
