//! Analytics routes
//!
//! Each handler wraps its (stubbed) business call in an audit capture so
//! the invocation is recorded with the declared action and risk level.

use axum::{
    extract::{Query, State},
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

/// Create analytics routes
pub fn routes() -> Router<FeatureState> {
    Router::new()
        .route("/analytics/kpis", get(get_financial_kpis))
        .route("/analytics/project-comparison", post(compare_projects))
}

#[derive(Debug, Deserialize)]
struct KpiParams {
    #[serde(default = "default_period")]
    period: String,
    project_id: Option<String>,
}

fn default_period() -> String {
    "monthly".to_string()
}

/// Get comprehensive financial KPIs
///
/// GET /analytics/kpis?period=monthly&project_id=P1
async fn get_financial_kpis(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Query(params): Query<KpiParams>,
) -> ServerResult<Response> {
    let kpis = state
        .audit
        .capture(&ctx, "CALCULATE_KPIS", "analytics", RiskLevel::Low, || async {
            calculate_financial_kpis(&params.period, params.project_id.as_deref())
        })
        .await?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": kpis,
            "period": params.period,
            "project_id": params.project_id,
        })),
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
struct CompareProjectsRequest {
    #[serde(default)]
    project_ids: Vec<String>,
}

/// Compare financial performance across projects
///
/// POST /analytics/project-comparison
async fn compare_projects(
    State(state): State<FeatureState>,
    ctx: RequestContext,
    Json(request): Json<CompareProjectsRequest>,
) -> ServerResult<Response> {
    let comparison = state
        .audit
        .capture(&ctx, "COMPARE_PROJECTS", "analytics", RiskLevel::Low, || async {
            if request.project_ids.len() < 2 {
                return Err(AppError::Validation(
                    "At least two project IDs are required for comparison".to_string(),
                ));
            }
            compare_project_financials(&request.project_ids)
        })
        .await?;

    Ok((StatusCode::OK, Json(json!({"success": true, "data": comparison}))).into_response())
}

// Stand-ins for the opaque analytics engine.

fn calculate_financial_kpis(period: &str, project_id: Option<&str>) -> ServerResult<JsonValue> {
    Ok(json!({
        "period": period,
        "scope": project_id.unwrap_or("portfolio"),
        "gross_margin_pct": 18.4,
        "operating_margin_pct": 7.2,
        "revenue_cad": 12_450_000,
        "backlog_cad": 31_200_000,
    }))
}

fn compare_project_financials(project_ids: &[String]) -> ServerResult<JsonValue> {
    let rows: Vec<JsonValue> = project_ids
        .iter()
        .map(|id| {
            json!({
                "project_id": id,
                "margin_pct": 9.1,
                "cost_variance_pct": -2.3,
            })
        })
        .collect();

    Ok(json!({ "projects": rows }))
}
