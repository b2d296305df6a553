//! Database queries for audit trails

use sqlx::PgPool;
use tracing::debug;

use super::models::{AuditEntry, TrailQuery, DEFAULT_TRAIL_LIMIT, MAX_TRAIL_LIMIT};
use crate::error::ServerResult;

fn effective_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_TRAIL_LIMIT
    } else {
        limit.min(MAX_TRAIL_LIMIT)
    }
}

/// Retrieve the audit trail matching the supplied filters
///
/// Filters are AND-composed and the time range is inclusive on both
/// ends. Results are ordered most recent first, with the entry id as a
/// deterministic tie-break, and capped at the query limit. Unlike the
/// write path, query errors surface to the caller: retrieval is never on
/// a business-critical path.
pub async fn get_audit_trail(pool: &PgPool, query: TrailQuery) -> ServerResult<Vec<AuditEntry>> {
    let limit = effective_limit(query.limit);

    let mut sql = String::from(
        r#"
        SELECT
            id, user_id, user_email, session_id, ip_address, user_agent,
            action, resource_type, resource_id, service_name, http_method,
            endpoint, request_payload, response_payload, old_values,
            new_values, business_context, risk_level, compliance_flags,
            timestamp, processing_time_ms, status, error_message,
            retention_period_days, archived, archived_at
        FROM audit_logs
        WHERE 1=1
        "#,
    );

    let mut bind_count = 1;
    let mut conditions = Vec::new();

    // Build dynamic query based on filters
    if query.resource_type.is_some() {
        conditions.push(format!("resource_type = ${}", bind_count));
        bind_count += 1;
    }
    if query.resource_id.is_some() {
        conditions.push(format!("resource_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.user_id.is_some() {
        conditions.push(format!("user_id = ${}", bind_count));
        bind_count += 1;
    }
    if query.start_time.is_some() {
        conditions.push(format!("timestamp >= ${}", bind_count));
        bind_count += 1;
    }
    if query.end_time.is_some() {
        conditions.push(format!("timestamp <= ${}", bind_count));
        bind_count += 1;
    }

    for condition in conditions {
        sql.push_str(" AND ");
        sql.push_str(&condition);
    }

    sql.push_str(" ORDER BY timestamp DESC, id DESC");
    sql.push_str(&format!(" LIMIT ${}", bind_count));

    let mut query_builder = sqlx::query_as::<_, AuditEntry>(&sql);

    // Bind parameters in order
    if let Some(resource_type) = query.resource_type {
        query_builder = query_builder.bind(resource_type);
    }
    if let Some(resource_id) = query.resource_id {
        query_builder = query_builder.bind(resource_id);
    }
    if let Some(user_id) = query.user_id {
        query_builder = query_builder.bind(user_id);
    }
    if let Some(start_time) = query.start_time {
        query_builder = query_builder.bind(start_time);
    }
    if let Some(end_time) = query.end_time {
        query_builder = query_builder.bind(end_time);
    }

    query_builder = query_builder.bind(limit);

    let records = query_builder.fetch_all(pool).await?;

    debug!(count = records.len(), "Retrieved audit trail");

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::models::{NewAuditEntry, RiskLevel};
    use crate::audit::writer::AuditWriter;
    use crate::config::AuditConfig;
    use serde_json::json;

    #[test]
    fn test_effective_limit() {
        assert_eq!(effective_limit(0), DEFAULT_TRAIL_LIMIT);
        assert_eq!(effective_limit(-5), DEFAULT_TRAIL_LIMIT);
        assert_eq!(effective_limit(25), 25);
        assert_eq!(effective_limit(5000), MAX_TRAIL_LIMIT);
    }

    async fn seed(writer: &AuditWriter, action: &str, resource_type: &str, resource_id: &str, user_id: &str) {
        let mut entry = NewAuditEntry::builder()
            .action(action)
            .resource_type(resource_type)
            .resource_id(resource_id)
            .risk_level(RiskLevel::Low)
            .try_build()
            .unwrap();
        entry.user_id = user_id.to_string();
        assert!(writer.record(entry).await.is_some());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_trail_filters_by_resource(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        seed(&writer, "CREATE", "project", "P1", "u-1").await;
        seed(&writer, "UPDATE", "project", "P1", "u-2").await;
        seed(&writer, "CREATE", "project", "P2", "u-1").await;
        seed(&writer, "CREATE", "payment", "P1", "u-1").await;

        let query = TrailQuery {
            resource_type: Some("project".to_string()),
            resource_id: Some("P1".to_string()),
            ..Default::default()
        };
        let trail = get_audit_trail(&pool, query).await.unwrap();

        assert_eq!(trail.len(), 2);
        assert!(trail
            .iter()
            .all(|r| r.resource_type == "project" && r.resource_id.as_deref() == Some("P1")));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_trail_filters_by_user(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        seed(&writer, "READ", "report", "R1", "u-7").await;
        seed(&writer, "READ", "report", "R2", "u-7").await;
        seed(&writer, "READ", "report", "R3", "u-8").await;

        let query = TrailQuery {
            user_id: Some("u-7".to_string()),
            ..Default::default()
        };
        let trail = get_audit_trail(&pool, query).await.unwrap();

        assert_eq!(trail.len(), 2);
        assert!(trail.iter().all(|r| r.user_id == "u-7"));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_trail_orders_most_recent_first(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        for i in 0..4 {
            seed(&writer, "UPDATE", "budget", &format!("B-{i}"), "u-1").await;
        }

        let trail = get_audit_trail(&pool, TrailQuery::default()).await.unwrap();

        assert_eq!(trail.len(), 4);
        assert!(trail
            .windows(2)
            .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_trail_respects_limit(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        for i in 0..6 {
            seed(&writer, "READ", "report", &format!("R-{i}"), "u-1").await;
        }

        let query = TrailQuery {
            limit: 3,
            ..Default::default()
        };
        let trail = get_audit_trail(&pool, query).await.unwrap();

        assert_eq!(trail.len(), 3);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_trail_time_range_is_inclusive(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        seed(&writer, "CREATE", "project", "P1", "u-1").await;
        seed(&writer, "CREATE", "project", "P2", "u-1").await;

        let all = get_audit_trail(&pool, TrailQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        let newest = all[0].timestamp;
        let oldest = all[1].timestamp;

        // Boundaries equal to record timestamps still match.
        let query = TrailQuery {
            start_time: Some(oldest),
            end_time: Some(newest),
            ..Default::default()
        };
        let within = get_audit_trail(&pool, query).await.unwrap();
        assert_eq!(within.len(), 2);

        let query = TrailQuery {
            start_time: Some(newest),
            end_time: Some(newest),
            ..Default::default()
        };
        let exact = get_audit_trail(&pool, query).await.unwrap();
        assert!(exact.iter().any(|r| r.timestamp == newest));
        assert!(exact.iter().all(|r| r.timestamp == newest));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_value_snapshots_round_trip(pool: PgPool) {
        let writer = AuditWriter::new(pool.clone(), AuditConfig::default());

        let old_values = json!({"limit": 100000, "currency": "CAD"});
        let new_values = json!({"limit": 250000, "currency": "CAD", "approved_by": "u-3"});

        let entry = NewAuditEntry::builder()
            .action("MODIFY_BUDGET")
            .resource_type("budget")
            .resource_id("B-2041")
            .old_values(old_values.clone())
            .new_values(new_values.clone())
            .risk_level(RiskLevel::High)
            .try_build()
            .unwrap();
        assert!(writer.record(entry).await.is_some());

        let query = TrailQuery {
            resource_type: Some("budget".to_string()),
            resource_id: Some("B-2041".to_string()),
            ..Default::default()
        };
        let trail = get_audit_trail(&pool, query).await.unwrap();

        assert_eq!(trail.len(), 1);
        assert_eq!(trail[0].old_values, Some(old_values));
        assert_eq!(trail[0].new_values, Some(new_values));
        assert_eq!(trail[0].risk_level, "HIGH");
    }
}
