//! Risk management routes

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::features::FeatureState;
use crate::audit::{RequestContext, RiskLevel};
use crate::error::{AppError, ServerResult};

/// Create risk management routes
pub fn routes() -> Router<FeatureState> {
    Router::new()
        .route("/risk/assessments", post(assess_project_risk))
        .route("/risk/alerts", get(get_risk_alerts))
}

#[derive(Debug, Deserialize)]
struct AssessProjectRequest {
    project_id: Option<String>,
    #[serde(default = "default_assessment_type")]
    assessment_type: String,
}

fn default_assessment_type() -> String {
    "comprehensive".to_string()
}

/// Comprehensive project risk assessment
///
/// POST /risk/assessments
async fn assess_project_risk(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Json(request): Json<AssessProjectRequest>,
) -> ServerResult<Response> {
    let assessment = state
        .audit
        .capture(
            &ctx,
            "ASSESS_PROJECT_RISK",
            "risk_assessment",
            RiskLevel::Medium,
            || async {
                let project_id = request
                    .project_id
                    .as_deref()
                    .ok_or_else(|| AppError::Validation("Project ID required".to_string()))?;
                assess_risk(project_id, &request.assessment_type)
            },
        )
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": assessment,
            "project_id": request.project_id,
            "assessment_type": request.assessment_type,
        })),
    )
        .into_response())
}

/// Active risk alerts across the portfolio
///
/// GET /risk/alerts
async fn get_risk_alerts(
    State(state): State<FeatureState>,
    ctx: RequestContext,
) -> ServerResult<Response> {
    let alerts = state
        .audit
        .capture(&ctx, "LIST_RISK_ALERTS", "risk_alert", RiskLevel::Low, || async {
            active_alerts()
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({"success": true, "data": alerts}))).into_response())
}

// Stand-ins for the opaque risk engine.

fn assess_risk(project_id: &str, assessment_type: &str) -> ServerResult<JsonValue> {
    Ok(json!({
        "project_id": project_id,
        "assessment_type": assessment_type,
        "overall_score": 62,
        "classification": "MEDIUM",
        "factors": [
            {"name": "schedule_slippage", "score": 71},
            {"name": "cost_overrun", "score": 58},
            {"name": "counterparty_credit", "score": 49},
        ],
    }))
}

fn active_alerts() -> ServerResult<JsonValue> {
    Ok(json!([
        {"alert_id": "RA-301", "severity": "HIGH", "message": "Cash buffer below threshold on project P-204"},
        {"alert_id": "RA-302", "severity": "MEDIUM", "message": "Supplier credit score downgraded"},
    ]))
}
