//! FinHub Server Library
//!
//! Compliance audit-trail service for the Construction Hub financial
//! platform.
//!
//! # Overview
//!
//! The server wraps business operations at the service boundary so that
//! every invocation leaves exactly one immutable audit record:
//!
//! - **Audit Core**: record model, writer, capture wrapper, and trail
//!   queries in the [`audit`] module
//! - **Database Management**: PostgreSQL integration with SQLx
//! - **Configuration**: environment-based configuration management
//! - **Middleware**: CORS and request tracing
//!
//! # Audit Logging
//!
//! Every captured operation is recorded with:
//! - Actor identity (user id, email, session) from the request context
//! - Action, resource type, and caller-declared risk level
//! - Outcome (success/failure), timing, and error details
//! - Before/after value snapshots for data changes
//! - Compliance regime tags and the retention period
//!
//! Audit persistence is strictly best-effort: a failed write is reported
//! on the diagnostic log and dropped, and the wrapped business operation
//! never observes it. Query the trail via `GET /api/v1/audit`.
//!
//! # Framework Stack
//!
//! - **Axum**: web framework for the service boundary
//! - **SQLx**: PostgreSQL persistence for the audit store
//! - **Tower**: middleware and service abstractions
//!
//! # Example
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
//! let result: Result<&str, std::io::Error> = writer
//!     .capture(&ctx, "CREATE", "payment", RiskLevel::Medium, || async {
//!         Ok("payment created")
//!     })
//!     .await;
//! # let _ = result;
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
