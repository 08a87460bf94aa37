//! # Vigil Server
//!
//! Backend-for-frontend for the Vigil compliance platform.
//!
//! ## Overview
//!
//! Thin HTTP modules over a shared document store and externally hosted
//! agents:
//!
//! - **Alerts**: listing with a TTL-gated engine refresh (sync or background)
//! - **Tasks**: compliance tasks created from alert rules
//! - **Watch**: regulatory-watch findings and on-demand analysis
//! - **Procedures**: declarations projected onto the frontend board
//! - **Auth**: account registration and bearer-token sessions
//! - **Declarations**: filing workflow and summary document export
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL as the document store
//! - reqwest clients for the alert engine and fiscal agent
//! - jsonwebtoken/argon2 for first-party sessions

pub mod handlers;
pub mod infra;
pub mod routes;

use axum::{Router, routing::get};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

pub use infra::app_state::AppState;

/// Assemble the full application router: root probes, versioned API, CORS,
/// and request tracing.
pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router(state.clone());

    let cors_layer = if state.config.dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<axum::http::HeaderValue> = state
            .config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|s| axum::http::HeaderValue::from_str(s).ok())
            .collect();
        let allow_origin = if origins.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(origins)
        };
        CorsLayer::new().allow_origin(allow_origin)
    };

    Router::new()
        .route("/ping", get(handlers::ping_handler))
        .route("/health", get(handlers::health_handler))
        .merge(versioned_api)
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
