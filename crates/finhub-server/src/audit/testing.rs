//! In-memory audit sinks for exercising capture semantics without a
//! database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::models::{AuditEntry, NewAuditEntry};
use super::writer::AuditSink;
use crate::error::{AppError, ServerResult};

/// Sink that materializes entries into a vector
#[derive(Default)]
pub(crate) struct MemorySink {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemorySink {
    pub(crate) fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn persist(&self, entry: &NewAuditEntry) -> ServerResult<AuditEntry> {
        let compliance_flags = if entry.compliance_flags.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&entry.compliance_flags).map_err(finhub_common::CoreError::from)?)
        };

        let record = AuditEntry {
            id: Uuid::new_v4(),
            user_id: entry.user_id.clone(),
            user_email: entry.user_email.clone(),
            session_id: entry.session_id.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            action: entry.action.clone(),
            resource_type: entry.resource_type.clone(),
            resource_id: entry.resource_id.clone(),
            service_name: entry
                .service_name
                .clone()
                .unwrap_or_else(|| "financial-advanced".to_string()),
            http_method: entry.http_method.clone(),
            endpoint: entry.endpoint.clone(),
            request_payload: entry.request_payload.clone(),
            response_payload: entry.response_payload.clone(),
            old_values: entry.old_values.clone(),
            new_values: entry.new_values.clone(),
            business_context: entry.business_context.clone(),
            risk_level: entry.risk_level.as_str().to_string(),
            compliance_flags,
            timestamp: Utc::now(),
            processing_time_ms: entry.processing_time_ms,
            status: entry.status.as_str().to_string(),
            error_message: entry.error_message.clone(),
            retention_period_days: entry.retention_period_days.unwrap_or(2555),
            archived: false,
            archived_at: None,
        };

        self.entries.lock().unwrap().push(record.clone());
        Ok(record)
    }
}

/// Sink that refuses every write, standing in for an unavailable store
pub(crate) struct FailingSink;

#[async_trait]
impl AuditSink for FailingSink {
    async fn persist(&self, _entry: &NewAuditEntry) -> ServerResult<AuditEntry> {
        Err(AppError::Database(sqlx::Error::PoolClosed))
    }
}
