//! Audit data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::context::RequestContext;

// ============================================================================
// Trail Query Constants
// ============================================================================

/// Default number of audit entries returned per trail query
pub const DEFAULT_TRAIL_LIMIT: i64 = 100;

/// Maximum number of audit entries a single trail query may return.
/// Prevents excessive memory usage and query timeouts.
pub const MAX_TRAIL_LIMIT: i64 = 1000;

/// Resource type recorded when the caller does not declare one
pub const UNKNOWN_RESOURCE_TYPE: &str = "unknown";

/// Audit log entry from the database
///
/// Append-only: once persisted, no field is ever mutated except the
/// archival pair, which belongs to the external retention process.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AuditEntry {
    /// Unique identifier for the audit entry
    pub id: Uuid,
    /// Actor who performed the action ("system" when no caller context)
    pub user_id: String,
    /// Actor email, when known
    pub user_email: Option<String>,
    /// Session the action was performed under
    pub session_id: Option<String>,
    /// Client IP address (IPv4 or IPv6)
    pub ip_address: Option<String>,
    /// Client user agent string
    pub user_agent: Option<String>,
    /// Verb describing the operation (CREATE, HEALTH_CHECK, ...)
    pub action: String,
    /// Noun describing what was acted on
    pub resource_type: String,
    /// Identity of the specific resource instance, when known
    pub resource_id: Option<String>,
    /// Owning service in a multi-service landscape
    pub service_name: String,
    /// HTTP method of the inbound request, when available
    pub http_method: Option<String>,
    /// Endpoint path of the inbound request, when available
    pub endpoint: Option<String>,
    /// Request body captured verbatim
    pub request_payload: Option<JsonValue>,
    /// Response body captured verbatim (usually disabled for performance)
    pub response_payload: Option<JsonValue>,
    /// Values before a mutating operation
    pub old_values: Option<JsonValue>,
    /// Values after a mutating operation
    pub new_values: Option<JsonValue>,
    /// Human-readable explanation of the operation
    pub business_context: Option<String>,
    /// Caller-declared sensitivity (LOW, MEDIUM, HIGH, CRITICAL)
    pub risk_level: String,
    /// Regulatory regimes the action is relevant to (JSON array)
    pub compliance_flags: Option<JsonValue>,
    /// Capture time, set at construction
    pub timestamp: DateTime<Utc>,
    /// Wall-clock duration of the wrapped operation
    pub processing_time_ms: Option<i32>,
    /// Outcome of the wrapped operation (SUCCESS, FAILURE, WARNING)
    pub status: String,
    /// Present only when status is FAILURE
    pub error_message: Option<String>,
    /// Retention period fixed at creation; archival is external
    pub retention_period_days: i32,
    /// Whether the external retention process has archived this entry
    pub archived: bool,
    /// When the entry was archived
    pub archived_at: Option<DateTime<Utc>>,
}

/// Risk classification attached to an action for prioritized review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of a captured operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditStatus {
    #[default]
    Success,
    Failure,
    Warning,
}

impl AuditStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Warning => "WARNING",
        }
    }
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Regulatory regimes tracked for Canadian compliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComplianceFlag {
    /// Sarbanes-Oxley Act
    Sox,
    /// Personal Information Protection and Electronic Documents Act
    Pipeda,
    /// Accessibility for Ontarians with Disabilities Act
    Aoda,
    /// Financial Transactions and Reports Analysis Centre of Canada
    Fintrac,
}

impl ComplianceFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sox => "SOX",
            Self::Pipeda => "PIPEDA",
            Self::Aoda => "AODA",
            Self::Fintrac => "FINTRAC",
        }
    }
}

impl std::fmt::Display for ComplianceFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Filter parameters for trail retrieval
///
/// All supplied filters are combined with logical AND; omitted filters
/// are not applied. The time range is inclusive on both ends.
#[derive(Debug, Clone, Deserialize)]
pub struct TrailQuery {
    /// Filter by resource type
    pub resource_type: Option<String>,
    /// Filter by resource ID
    pub resource_id: Option<String>,
    /// Filter by actor
    pub user_id: Option<String>,
    /// Inclusive start of the time range
    pub start_time: Option<DateTime<Utc>>,
    /// Inclusive end of the time range
    pub end_time: Option<DateTime<Utc>>,
    /// Maximum number of results to return
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    DEFAULT_TRAIL_LIMIT
}

impl Default for TrailQuery {
    fn default() -> Self {
        Self {
            resource_type: None,
            resource_id: None,
            user_id: None,
            start_time: None,
            end_time: None,
            limit: default_limit(),
        }
    }
}

/// Input for creating an audit entry
///
/// `service_name` and `retention_period_days` are normally left unset and
/// stamped by the writer from its injected configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAuditEntry {
    pub user_id: String,
    pub user_email: Option<String>,
    pub session_id: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub service_name: Option<String>,
    pub http_method: Option<String>,
    pub endpoint: Option<String>,
    pub request_payload: Option<JsonValue>,
    pub response_payload: Option<JsonValue>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
    pub business_context: Option<String>,
    pub risk_level: RiskLevel,
    pub compliance_flags: Vec<ComplianceFlag>,
    pub processing_time_ms: Option<i32>,
    pub status: AuditStatus,
    pub error_message: Option<String>,
    pub retention_period_days: Option<i32>,
}

impl NewAuditEntry {
    /// Create a builder for constructing audit entries
    pub fn builder() -> NewAuditEntryBuilder {
        NewAuditEntryBuilder::default()
    }
}

/// Builder for audit entries
#[derive(Debug, Clone, Default)]
pub struct NewAuditEntryBuilder {
    user_id: Option<String>,
    user_email: Option<String>,
    session_id: Option<String>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    action: Option<String>,
    resource_type: Option<String>,
    resource_id: Option<String>,
    http_method: Option<String>,
    endpoint: Option<String>,
    request_payload: Option<JsonValue>,
    response_payload: Option<JsonValue>,
    old_values: Option<JsonValue>,
    new_values: Option<JsonValue>,
    business_context: Option<String>,
    risk_level: RiskLevel,
    compliance_flags: Vec<ComplianceFlag>,
    processing_time_ms: Option<i32>,
    status: AuditStatus,
    error_message: Option<String>,
}

impl NewAuditEntryBuilder {
    /// Populate identity and request metadata from the caller's context
    pub fn context(mut self, ctx: &RequestContext) -> Self {
        self.user_id = Some(ctx.user_id.clone());
        self.user_email = ctx.user_email.clone();
        self.session_id = ctx.session_id.clone();
        self.ip_address = ctx.ip_address.clone();
        self.user_agent = ctx.user_agent.clone();
        self.http_method = ctx.http_method.clone();
        self.endpoint = ctx.endpoint.clone();
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn resource_type(mut self, resource_type: impl Into<String>) -> Self {
        self.resource_type = Some(resource_type.into());
        self
    }

    pub fn resource_id(mut self, resource_id: impl Into<String>) -> Self {
        self.resource_id = Some(resource_id.into());
        self
    }

    pub fn request_payload(mut self, payload: JsonValue) -> Self {
        self.request_payload = Some(payload);
        self
    }

    pub fn response_payload(mut self, payload: JsonValue) -> Self {
        self.response_payload = Some(payload);
        self
    }

    pub fn old_values(mut self, values: JsonValue) -> Self {
        self.old_values = Some(values);
        self
    }

    pub fn new_values(mut self, values: JsonValue) -> Self {
        self.new_values = Some(values);
        self
    }

    pub fn business_context(mut self, context: impl Into<String>) -> Self {
        self.business_context = Some(context.into());
        self
    }

    pub fn risk_level(mut self, risk_level: RiskLevel) -> Self {
        self.risk_level = risk_level;
        self
    }

    pub fn compliance_flags(mut self, flags: Vec<ComplianceFlag>) -> Self {
        self.compliance_flags = flags;
        self
    }

    pub fn processing_time_ms(mut self, millis: i32) -> Self {
        self.processing_time_ms = Some(millis);
        self
    }

    pub fn status(mut self, status: AuditStatus) -> Self {
        self.status = status;
        self
    }

    pub fn error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Build the entry, validating the required fields and invariants
    ///
    /// The recorded action is upper-cased; an empty or missing resource
    /// type becomes `"unknown"`. A FAILURE entry must carry a non-empty
    /// error message.
    pub fn try_build(self) -> Result<NewAuditEntry, &'static str> {
        let action = match self.action {
            Some(a) if !a.trim().is_empty() => a.to_uppercase(),
            _ => return Err("action is required"),
        };

        let resource_type = match self.resource_type {
            Some(r) if !r.trim().is_empty() => r,
            _ => UNKNOWN_RESOURCE_TYPE.to_string(),
        };

        if self.status == AuditStatus::Failure
            && self.error_message.as_deref().map_or(true, str::is_empty)
        {
            return Err("a FAILURE entry requires an error message");
        }

        Ok(NewAuditEntry {
            user_id: self
                .user_id
                .unwrap_or_else(|| super::context::SYSTEM_USER_ID.to_string()),
            user_email: self.user_email,
            session_id: self.session_id,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            action,
            resource_type,
            resource_id: self.resource_id,
            service_name: None,
            http_method: self.http_method,
            endpoint: self.endpoint,
            request_payload: self.request_payload,
            response_payload: self.response_payload,
            old_values: self.old_values,
            new_values: self.new_values,
            business_context: self.business_context,
            risk_level: self.risk_level,
            compliance_flags: self.compliance_flags,
            processing_time_ms: self.processing_time_ms,
            status: self.status,
            error_message: self.error_message,
            retention_period_days: None,
        })
    }
}
