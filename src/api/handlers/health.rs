//! Liveness and readiness probes.

use axum::{Json, extract::State, http::StatusCode};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::api::doc::HEALTH_TAG;
use crate::api::dto::{HealthResponse, HealthStatus};
use crate::state::AppState;

/// Creates health check routes.
///
/// # Routes
/// - `GET /health/live` - Liveness probe
/// - `GET /health/ready` - Readiness probe
pub fn health_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(liveness_check))
        .routes(routes!(readiness_check))
}

/// The process is up and serving requests.
#[utoipa::path(
    get,
    path = "/health/live",
    tag = HEALTH_TAG,
    responses((status = 200, description = "Service is alive", body = HealthResponse))
)]
async fn liveness_check() -> Json<HealthResponse> {
    Json(HealthResponse::new(HealthStatus::Healthy))
}

/// The user store answers a round trip.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service is ready", body = HealthResponse),
        (status = 503, description = "User store is unreachable", body = HealthResponse)
    )
)]
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let users = &state.services.users;
    match users.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthResponse::new(HealthStatus::Healthy).with_storage(users.store_kind())),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse::new(HealthStatus::Unhealthy).with_storage(users.store_kind())),
            )
        }
    }
}
