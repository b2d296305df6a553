//! Business feature routes
//!
//! The analytics, risk, and reporting services are external collaborators
//! of the audit core; the handlers here are the thin boundary that calls
//! them and declares the `(action, resource_type, risk_level)` triple for
//! each capture. The handlers return canned payloads in place of the
//! opaque business engines.

use axum::Router;

use crate::audit::AuditWriter;

pub mod analytics;
pub mod reporting;
pub mod risk;

/// State shared by feature handlers
#[derive(Clone)]
pub struct FeatureState {
    pub audit: AuditWriter,
}

/// Create the combined feature router
pub fn router(state: FeatureState) -> Router {
    Router::new()
        .merge(analytics::routes())
        .merge(risk::routes())
        .merge(reporting::routes())
        .with_state(state)
}
