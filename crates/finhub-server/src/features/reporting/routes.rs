//! Reporting routes
//!
//! The schedule handler also demonstrates the manual logging path: a
//! created schedule is a data change, so it is recorded with explicit
//! before/after values and a resource id, which generic capture cannot
//! supply.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use crate::features::FeatureState;
use crate::audit::{LogAction, RequestContext, RiskLevel};
use crate::error::{AppError, ServerResult};

/// Create reporting routes
pub fn routes() -> Router<FeatureState> {
    Router::new()
        .route("/reporting/custom-report", post(generate_custom_report))
        .route("/reporting/schedules", post(create_report_schedule))
}

#[derive(Debug, Deserialize)]
struct CustomReportRequest {
    report_type: Option<String>,
    #[serde(default)]
    sections: Vec<String>,
}

/// Generate a custom financial report
///
/// POST /reporting/custom-report
async fn generate_custom_report(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Json(request): Json<CustomReportRequest>,
) -> ServerResult<Response> {
    let report = state
        .audit
        .capture(&ctx, "GENERATE_REPORT", "report", RiskLevel::Medium, || async {
            let report_type = request
                .report_type
                .as_deref()
                .ok_or_else(|| AppError::Validation("Report type required".to_string()))?;
            build_report(report_type, &request.sections)
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({"success": true, "data": report}))).into_response())
}

#[derive(Debug, Deserialize)]
struct ScheduleRequest {
    report_type: String,
    frequency: String,
    #[serde(default)]
    recipients: Vec<String>,
}

/// Create a scheduled report
///
/// POST /reporting/schedules
async fn create_report_schedule(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Json(request): Json<ScheduleRequest>,
) -> ServerResult<Response> {
    let schedule_id = Uuid::new_v4().to_string();
    let schedule = json!({
        "schedule_id": schedule_id,
        "report_type": request.report_type,
        "frequency": request.frequency,
        "recipients": request.recipients,
        "active": true,
    });

    let mut log = LogAction::new("CREATE", "report_schedule")
        .resource_id(schedule_id.clone())
        .new_values(schedule.clone())
        .business_context(format!(
            "Scheduled {} report ({})",
            request.report_type, request.frequency
        ))
        .risk_level(RiskLevel::Low);
    if state.audit.config().log_request_body {
        log = log.request_payload(json!({
            "report_type": request.report_type,
            "frequency": request.frequency,
            "recipients": request.recipients,
        }));
    }

    state.audit.log_action(&ctx, log).await;

    Ok((StatusCode::CREATED, Json(json!({"success": true, "data": schedule}))).into_response())
}

// Stand-in for the opaque reporting engine.

fn build_report(report_type: &str, sections: &[String]) -> ServerResult<JsonValue> {
    Ok(json!({
        "report_type": report_type,
        "sections": sections,
        "generated": true,
        "line_items": 128,
    }))
}
