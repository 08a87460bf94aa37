pub mod alerts;
pub mod auth;
pub mod declarations;
pub mod procedures;
pub mod settings;
pub mod tasks;
pub mod watch;

use axum::{extract::State, http::StatusCode, response::Json};
use serde_json::{Value, json};
use tracing::info;

use crate::AppState;

pub async fn ping_handler() -> Json<Value> {
    info!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "Vigil backend is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<Value>, StatusCode> {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let mut is_unhealthy = false;

    match state.store.refresh_state.last_refresh().await {
        Ok(last_refresh) => {
            health_status["checks"]["store"] = json!({
                "status": "healthy",
                "last_refresh": last_refresh,
            });
        }
        Err(e) => {
            health_status["checks"]["store"] = json!({
                "status": "unhealthy",
                "error": e.to_string()
            });
            is_unhealthy = true;
        }
    }

    health_status["checks"]["modules"] = json!({
        "alerts": if state.engine.is_some() { "active" } else { "degraded" },
        "watch": if state.watch.is_some() { "active" } else { "degraded" },
        "tasks": "active",
        "procedures": "active",
    });

    if is_unhealthy {
        health_status["status"] = json!("unhealthy");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    } else {
        Ok(Json(health_status))
    }
}
