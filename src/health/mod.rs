/*!
 * # Health Check Module
 *
 * Monitoring endpoints for the Farjad ERP API:
 *
 * - `/health`: static liveness body, also mounted at `/api/v1/core/health`
 * - `/health/ready`: pings the database, 503 when it is unreachable
 * - `/health/live`: process uptime
 * - `/health/version`: build metadata
 */

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error};
use utoipa::ToSchema;

pub const SERVICE_MESSAGE: &str = "Farjad ERP API is running";

/// Component status
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Body of `GET /health`
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "Farjad ERP API is running")]
    pub message: String,
    pub version: String,
}

/// Body of `GET /health/ready`
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct ReadinessResponse {
    pub ready: bool,
    pub database: HealthStatus,
    /// Round trip of the database ping
    pub latency_ms: u64,
    pub timestamp: DateTime<Utc>,
}

/// Body of `GET /health/version`
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct VersionInfo {
    pub name: String,
    pub version: String,
    pub commit: String,
    pub built: String,
}

#[derive(Clone)]
pub struct HealthState {
    pub db_pool: Arc<DatabaseConnection>,
    pub start_time: Instant,
}

impl HealthState {
    pub fn new(db_pool: Arc<DatabaseConnection>) -> Self {
        Self {
            db_pool,
            start_time: Instant::now(),
        }
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    async fn check_database(&self) -> (HealthStatus, Duration) {
        let started = Instant::now();
        let status = match self.db_pool.ping().await {
            Ok(()) => HealthStatus::Up,
            Err(e) => {
                error!(error = %e, "Database health check failed");
                HealthStatus::Down
            }
        };
        (status, started.elapsed())
    }
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    summary = "Liveness",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check endpoint called");
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: SERVICE_MESSAGE.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "health",
    summary = "Readiness",
    responses(
        (status = 200, description = "Database reachable", body = ReadinessResponse),
        (status = 503, description = "Database unreachable", body = ReadinessResponse),
    )
)]
pub async fn readiness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    let (database, latency) = state.check_database().await;
    let ready = database == HealthStatus::Up;
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(ReadinessResponse {
            ready,
            database,
            latency_ms: latency.as_millis() as u64,
            timestamp: Utc::now(),
        }),
    )
}

pub async fn liveness_check(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "alive": true,
        "uptime_seconds": state.uptime().as_secs(),
        "timestamp": Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/health/version",
    tag = "health",
    summary = "Build metadata",
    responses((status = 200, description = "Version and build information", body = VersionInfo))
)]
pub async fn version_info() -> Json<VersionInfo> {
    Json(VersionInfo {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        built: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
    })
}

/// Router mounted at `/health`
pub fn health_routes(db_pool: Arc<DatabaseConnection>) -> Router {
    let state = Arc::new(HealthState::new(db_pool));

    Router::new()
        .route("/", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
        .route("/version", get(version_info))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    #[tokio::test]
    async fn health_body_is_static() {
        let Json(body) = health_check().await;
        assert_eq!(body.status, "healthy");
        assert_eq!(body.message, SERVICE_MESSAGE);
        assert_eq!(body.version, env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn readiness_is_ok_against_live_database() {
        let db = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        let app = health_routes(Arc::new(db));

        let response = app
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
