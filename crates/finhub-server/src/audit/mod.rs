//! Audit trail module
//!
//! This module provides the compliance audit trail for the service: every
//! business operation wrapped with [`AuditWriter::capture`] produces
//! exactly one immutable audit record, whether the operation succeeds or
//! fails. Records carry actor identity, the action and resource acted on,
//! a caller-declared risk level, timing, outcome, and optional before and
//! after value snapshots.
//!
//! # Architecture
//!
//! - **Capture** wraps a business operation, measures it, and records the
//!   outcome. The wrapped operation's result is returned unchanged.
//! - **Persistence is best-effort**: a failed audit write is reported on
//!   the diagnostic log and dropped. Business operations never fail
//!   because the audit store is unavailable.
//! - **Queries** retrieve filtered trails for compliance review and are
//!   independent of the write path.
//!
//! # Example: Capturing an operation
//!
//! ```no_run
//! use finhub_server::audit::{AuditWriter, RequestContext, RiskLevel};
//! use finhub_server::config::AuditConfig;
//! use sqlx::PgPool;
//!
//! # async fn example(pool: PgPool) {
//! let writer = AuditWriter::new(pool, AuditConfig::default());
//! let ctx = RequestContext::system();
//!
//! let outcome: Result<u64, sqlx::Error> = writer
//!     .capture(&ctx, "CREATE", "payment", RiskLevel::Medium, || async {
//!         // ... business logic ...
//!         Ok(42)
//!     })
//!     .await;
//! # let _ = outcome;
//! # }
//! ```
//!
//! # Example: Manual logging with value snapshots
//!
//! ```no_run
//! use finhub_server::audit::{AuditWriter, LogAction, RequestContext, RiskLevel};
//! use serde_json::json;
//!
//! # async fn example(writer: &AuditWriter, ctx: &RequestContext) {
//! let id = writer
//!     .log_action(
//!         ctx,
//!         LogAction::new("UPDATE", "budget")
//!             .resource_id("B-2041")
//!             .old_values(json!({"limit": 100_000}))
//!             .new_values(json!({"limit": 250_000}))
//!             .risk_level(RiskLevel::High),
//!     )
//!     .await;
//! # let _ = id;
//! # }
//! ```

mod capture;
mod context;
mod models;
mod queries;
mod writer;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use models::{
    AuditEntry, AuditStatus, ComplianceFlag, NewAuditEntry, NewAuditEntryBuilder, RiskLevel,
    TrailQuery, DEFAULT_TRAIL_LIMIT, MAX_TRAIL_LIMIT,
};
pub use queries::get_audit_trail;
pub use writer::{AuditSink, AuditWriter, LogAction, PgAuditSink};
