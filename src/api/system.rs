//! System API endpoints.

use axum::{Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::{ApiResponse, AppState, HealthResponse};

/// Reports whether the store answers a trivial query.
///
/// # Endpoint
/// `GET /api/system/health`
///
/// Always public. Returns 503 when the database check fails so load
/// balancers can act on the status code alone.
pub async fn health(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let (status, database) = match state.store().ping().await {
        Ok(()) => (StatusCode::OK, "connected"),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    let body = HealthResponse {
        status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
        database: database.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };

    (status, Json(ApiResponse::success(body)))
}
