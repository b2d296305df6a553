//! Cross-cutting operation capture
//!
//! [`AuditWriter::capture`] surrounds a business operation and guarantees
//! exactly one audit record per invocation, success or failure. The
//! operation is passed as a value (an async closure), never discovered
//! through reflection, and its outcome is returned to the caller
//! unchanged: capture is purely an observer.

use std::future::Future;
use std::time::Instant;

use tracing::error;

use super::context::RequestContext;
use super::models::{AuditStatus, NewAuditEntry, RiskLevel};
use super::writer::AuditWriter;

impl AuditWriter {
    /// Execute `op` and record its outcome
    ///
    /// On success the record carries `status = SUCCESS` and the declared
    /// risk level. On failure the record carries `status = FAILURE`, the
    /// error's display form, and `risk_level` forced to HIGH regardless
    /// of the declared level; the original error is then returned to the
    /// caller untouched.
    ///
    /// The write happens in-line before returning, and a persistence
    /// failure is absorbed by [`AuditWriter::record`]. `resource_id` is
    /// not derivable from generic wrapping and is recorded as absent;
    /// callers that know it use [`AuditWriter::log_action`].
    pub async fn capture<F, Fut, T, E>(
        &self,
        ctx: &RequestContext,
        action: &str,
        resource_type: &str,
        risk_level: RiskLevel,
        op: F,
    ) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let result = op().await;
        let elapsed_ms = i32::try_from(started.elapsed().as_millis()).unwrap_or(i32::MAX);

        let builder = NewAuditEntry::builder()
            .context(ctx)
            .action(action)
            .resource_type(resource_type)
            .processing_time_ms(elapsed_ms);

        let entry = match &result {
            Ok(_) => builder
                .risk_level(risk_level)
                .business_context(format!(
                    "Operation {} on {} executed successfully",
                    action.to_uppercase(),
                    resource_type
                ))
                .try_build(),
            Err(e) => builder
                .status(AuditStatus::Failure)
                .risk_level(RiskLevel::High)
                .error_message(e.to_string())
                .business_context(format!("Error occurred: {e}"))
                .try_build(),
        };

        match entry {
            Ok(entry) => {
                // The id is deliberately discarded: the business path must
                // not depend on whether the write landed.
                let _ = self.record(entry).await;
            },
            Err(reason) => error!(action, resource_type, reason, "Failed to build audit entry"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::testing::{FailingSink, MemorySink};
    use crate::config::AuditConfig;
    use serde_json::json;
    use std::sync::Arc;

    fn memory_writer() -> (AuditWriter, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        let writer = AuditWriter::with_sink(sink.clone(), AuditConfig::default());
        (writer, sink)
    }

    #[tokio::test]
    async fn test_success_records_declared_risk() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext::system();

        let result: Result<i64, sqlx::Error> = writer
            .capture(&ctx, "CREATE", "project", RiskLevel::Medium, || async {
                Ok(7)
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, "SUCCESS");
        assert_eq!(entries[0].risk_level, "MEDIUM");
        assert_eq!(entries[0].action, "CREATE");
        assert_eq!(entries[0].resource_type, "project");
        assert!(entries[0].processing_time_ms.is_some());
        assert_eq!(
            entries[0].business_context.as_deref(),
            Some("Operation CREATE on project executed successfully")
        );
        assert!(entries[0].error_message.is_none());
    }

    #[tokio::test]
    async fn test_failure_escalates_to_high_risk() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext::system();

        let result: Result<(), String> = writer
            .capture(&ctx, "CREATE", "payment", RiskLevel::Medium, || async {
                Err("insufficient funds".to_string())
            })
            .await;

        // The caller observes the original error unchanged.
        assert_eq!(result.unwrap_err(), "insufficient funds");

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, "FAILURE");
        assert_eq!(entries[0].risk_level, "HIGH");
        assert!(entries[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("insufficient funds"));
        assert_eq!(
            entries[0].business_context.as_deref(),
            Some("Error occurred: insufficient funds")
        );
    }

    #[tokio::test]
    async fn test_health_check_passthrough() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext::system();

        let result: Result<serde_json::Value, String> = writer
            .capture(&ctx, "HEALTH_CHECK", "system", RiskLevel::Low, || async {
                Ok(json!({"status": "healthy"}))
            })
            .await;

        assert_eq!(result.unwrap(), json!({"status": "healthy"}));
        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, "HEALTH_CHECK");
        assert_eq!(entries[0].status, "SUCCESS");
        assert_eq!(entries[0].risk_level, "LOW");
        assert_eq!(entries[0].user_id, "system");
    }

    #[tokio::test]
    async fn test_exactly_one_record_per_invocation() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext::system();

        for i in 0..5i64 {
            let _: Result<i64, String> = writer
                .capture(&ctx, "READ", "report", RiskLevel::Low, || async move {
                    if i % 2 == 0 {
                        Ok(i)
                    } else {
                        Err(format!("report {i} unavailable"))
                    }
                })
                .await;
        }

        assert_eq!(sink.len(), 5);
    }

    #[tokio::test]
    async fn test_store_failure_preserves_business_result() {
        let writer = AuditWriter::with_sink(Arc::new(FailingSink), AuditConfig::default());
        let ctx = RequestContext::system();

        let ok: Result<&str, String> = writer
            .capture(&ctx, "CREATE", "project", RiskLevel::Low, || async {
                Ok("created")
            })
            .await;
        assert_eq!(ok.unwrap(), "created");

        let err: Result<(), String> = writer
            .capture(&ctx, "DELETE", "project", RiskLevel::Critical, || async {
                Err("constraint violation".to_string())
            })
            .await;
        assert_eq!(err.unwrap_err(), "constraint violation");
    }

    #[tokio::test]
    async fn test_capture_records_caller_identity() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext {
            user_id: "u-55".to_string(),
            user_email: Some("controller@example.ca".to_string()),
            session_id: Some("sess-9".to_string()),
            ip_address: Some("192.0.2.10".to_string()),
            user_agent: Some("finhub-frontend/2.3".to_string()),
            http_method: Some("POST".to_string()),
            endpoint: Some("/api/v1/analytics/comparison".to_string()),
        };

        let _: Result<(), String> = writer
            .capture(&ctx, "COMPARE_PROJECTS", "analytics", RiskLevel::Low, || async { Ok(()) })
            .await;

        let entries = sink.entries();
        assert_eq!(entries[0].user_id, "u-55");
        assert_eq!(entries[0].session_id.as_deref(), Some("sess-9"));
        assert_eq!(entries[0].ip_address.as_deref(), Some("192.0.2.10"));
        assert_eq!(entries[0].http_method.as_deref(), Some("POST"));
        assert_eq!(
            entries[0].endpoint.as_deref(),
            Some("/api/v1/analytics/comparison")
        );
    }

    #[tokio::test]
    async fn test_lowercase_action_is_normalized() {
        let (writer, sink) = memory_writer();
        let ctx = RequestContext::system();

        let _: Result<(), String> = writer
            .capture(&ctx, "generate_report", "report", RiskLevel::Low, || async { Ok(()) })
            .await;

        assert_eq!(sink.entries()[0].action, "GENERATE_REPORT");
    }
}
