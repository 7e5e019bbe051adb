//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: Queries the photo cache
/// 2. **Enrichment queue**: Reports the pending-entry backlog
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let (database, enrichment_queue) = match state.photo_cache.pending_count().await {
        Ok(pending) => (
            CheckStatus {
                status: "ok".to_string(),
                message: None,
            },
            CheckStatus {
                status: "ok".to_string(),
                message: Some(format!("{pending} entries pending")),
            },
        ),
        Err(e) => (
            CheckStatus {
                status: "error".to_string(),
                message: Some(e.to_string()),
            },
            CheckStatus {
                status: "unknown".to_string(),
                message: None,
            },
        ),
    };

    let healthy = database.status == "ok";
    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            enrichment_queue,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
