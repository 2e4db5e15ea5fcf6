//! Health endpoints for probes and load balancers.
//!
//! The database pool is probed directly so a wedged pool shows up here
//! before it shows up as request failures.

use std::collections::HashMap;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::state::AppState;

/// Overall service health report.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    /// Application version
    pub version: String,
    /// ISO 8601 timestamp of this probe
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: String,
    /// Per-dependency results, keyed by component name
    pub checks: HashMap<String, ComponentHealth>,
}

/// The service either answers its dependencies or it does not; with a
/// single dependency there is no useful in-between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Result of probing a single dependency.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ComponentHealth {
    pub status: HealthStatus,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

/// Health endpoints mounted at `/health`, `/health/ready` and
/// `/health/live`.
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(health_check))
        .routes(routes!(readiness_check))
        .routes(routes!(liveness_check))
}

/// Full health report including database connectivity.
///
/// Unhealthy reports keep the JSON body so operators see which check
/// failed, with a 503 status for the load balancer.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "All checks passing", body = HealthResponse),
        (status = 503, description = "A check is failing, the body names it", body = HealthResponse)
    ),
    tag = HEALTH_TAG
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = check_database(&state).await;
    let status = database.status;

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        checks: HashMap::from([("database".to_string(), database)]),
    };

    (status_code(status), Json(response))
}

/// Readiness probe: ready only when the database answers.
#[utoipa::path(
    get,
    path = "/health/ready",
    responses(
        (status = 200, description = "Ready to accept traffic"),
        (status = 503, description = "Dependencies unavailable")
    ),
    tag = HEALTH_TAG
)]
pub async fn readiness_check(State(state): State<AppState>) -> StatusCode {
    status_code(check_database(&state).await.status)
}

/// Liveness probe: no dependency checks, responding at all is the signal.
#[utoipa::path(
    get,
    path = "/health/live",
    responses(
        (status = 200, description = "Process is responsive")
    ),
    tag = HEALTH_TAG
)]
pub async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// Round-trips `SELECT 1` through the pool and reports the latency.
async fn check_database(state: &AppState) -> ComponentHealth {
    use diesel_async::RunQueryDsl;

    let start = Instant::now();
    let result = match state.db_pool.get().await {
        Ok(mut conn) => diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(|e| format!("Query failed: {}", e)),
        Err(e) => Err(format!("Connection failed: {}", e)),
    };

    let elapsed = start.elapsed().as_millis() as u64;
    match result {
        Ok(()) => ComponentHealth {
            status: HealthStatus::Healthy,
            message: Some("Responding".to_string()),
            response_time_ms: Some(elapsed),
        },
        Err(message) => ComponentHealth {
            status: HealthStatus::Unhealthy,
            message: Some(message),
            response_time_ms: Some(elapsed),
        },
    }
}
