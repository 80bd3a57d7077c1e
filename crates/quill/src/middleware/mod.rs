//! Request-audit adapter
//!
//! Derives one audit event per handled request: the action comes from an
//! [`ActionMap`], actor and tenant from an explicit [`AuditContext`], and the
//! detail/metadata from the response status and elapsed time. Audit write
//! failures are logged and never reach the client.
//!
//! Use [`RequestAuditor::observe`] around synchronous handlers, or
//! [`AuditLayer`] for any `tower::Service` over `http` types.

mod action_map;
mod auditor;
mod layer;

pub use action_map::{ActionMap, ActionRule};
pub use auditor::{AuditContext, RequestAuditor, RequestInfo, ResponseStatus};
pub use layer::{AuditLayer, AuditService};
