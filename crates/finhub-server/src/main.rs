//! FinHub Server - Main entry point

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use finhub_common::logging::{init_logging, LogConfig};
use serde_json::json;
use sqlx::postgres::PgPoolOptions;
use std::{net::SocketAddr, time::Duration};
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tracing::info;

use finhub_server::{
    audit::{self, AuditWriter, RequestContext, RiskLevel, TrailQuery},
    config::Config,
    error::AppError,
    features, middleware, ServerResult,
};

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    db: sqlx::PgPool,
    audit: AuditWriter,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig::default()
        .with_file_prefix("finhub-server")
        .with_filter_directives("finhub_server=debug,tower_http=debug,sqlx=info");

    // Environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting FinHub Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.database.idle_timeout_secs))
        .connect(&config.database.url)
        .await?;

    info!("Database connection pool established");

    // Run migrations
    sqlx::migrate!("../../migrations")
        .run(&db_pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run migrations: {}", e))?;

    info!("Database migrations completed");

    // The audit writer carries the deployment's audit configuration;
    // handlers receive it through application state.
    let audit_writer = AuditWriter::new(db_pool.clone(), config.audit.clone());
    info!(
        service_name = %config.audit.service_name,
        retention_days = config.audit.retention_days,
        "Audit trail enabled"
    );

    // Create application state
    let state = AppState {
        db: db_pool,
        audit: audit_writer,
    };

    // Build the application router
    let app = create_router(state, &config);

    // Create socket address
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    // Create TCP listener
    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
    .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Create the application router with all routes and middleware
fn create_router(state: AppState, config: &Config) -> Router {
    let feature_state = features::FeatureState {
        audit: state.audit.clone(),
    };
    let feature_routes = features::router(feature_state);

    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/audit", get(query_audit_trail))
        .with_state(state.clone())
        .nest("/api/v1", feature_routes)
        // Apply layers from innermost to outermost
        .layer(CompressionLayer::new())
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Health check handler
///
/// Audited as HEALTH_CHECK on the system resource; with no caller
/// context the record is attributed to the "system" actor.
async fn health_check(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> ServerResult<Response> {
    let health = state
        .audit
        .capture(&ctx, "HEALTH_CHECK", "system", RiskLevel::Low, || async {
            let database = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
                Ok(_) => "connected",
                Err(e) => {
                    tracing::error!("Database health check failed: {:?}", e);
                    "unavailable"
                },
            };

            Ok::<_, AppError>(json!({
                "status": if database == "connected" { "healthy" } else { "degraded" },
                "service": "Construction Hub Financial Advanced Service",
                "database": database,
            }))
        })
        .await?;

    Ok((StatusCode::OK, Json(health)).into_response())
}

/// Query the audit trail
///
/// GET /api/v1/audit?resource_type=project&resource_id=P1&user_id=u-1
///     &start_time=...&end_time=...&limit=100
///
/// Retrieval is not on a business-critical path, so unlike the write
/// side its errors surface to the caller.
async fn query_audit_trail(
    State(state): State<AppState>,
    Query(query): Query<TrailQuery>,
) -> ServerResult<Response> {
    let trail = audit::get_audit_trail(&state.db, query).await?;
    let count = trail.len();

    Ok((StatusCode::OK, Json(json!({ "data": trail, "count": count }))).into_response())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs.min(5))).await;
}
