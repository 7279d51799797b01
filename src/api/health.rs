use axum::{extract::State, http::StatusCode, routing::get, Router};
use serde_json::{json, Value};

use crate::app_state::AppState;
use crate::utils::api_response::ApiResponse;

/// Defines health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check))
}

/// **Liveness Check**
/// Verifies that the API is running; does not touch the store.
async fn liveness_check() -> ApiResponse<Value> {
    ApiResponse::success(StatusCode::OK, "API is live", json!({ "status": "live" }))
}

/// **Readiness Check**
/// Pings the record store; `500` while it is unreachable.
async fn readiness_check(State(state): State<AppState>) -> Result<ApiResponse<Value>, ApiResponse<()>> {
    state.store.ping().await.map_err(|e| {
        tracing::warn!(error = %e, "readiness check failed");
        ApiResponse::<()>::error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Store unavailable",
            Some(json!({ "details": e.to_string() })),
        )
    })?;

    let collections: Vec<&str> = state.services().iter().map(|s| s.schema().collection).collect();
    Ok(ApiResponse::success(
        StatusCode::OK,
        "API is ready",
        json!({ "status": "ready", "collections": collections }),
    ))
}
