// handlers/public/health.rs - GET / and the health checks

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET / - service banner
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "message": "Burhani Guards API",
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
        "base_path": state.config.api.base_path,
    }))
}

/// GET {base}/health - API liveness plus a database round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    match state.functions.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "api": "Burhani Guards API",
                "version": env!("CARGO_PKG_VERSION"),
                "database": "ok",
                "timestamp": now,
            })),
        ),
        Err(e) => {
            tracing::error!("Health check database failure: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "degraded",
                    "api": "Burhani Guards API",
                    "version": env!("CARGO_PKG_VERSION"),
                    "database": "unavailable",
                    "timestamp": now,
                })),
            )
        }
    }
}

/// GET {base}/Login/health
pub async fn login_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Burhani Guards Login API",
        "database": "PostgreSQL"
    }))
}

/// GET {base}/Guards/health
pub async fn guards_health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "Burhani Guards Guards API",
        "database": "PostgreSQL"
    }))
}
