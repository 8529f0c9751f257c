// src/app.rs
//! Router composition shared by the binary and the tests

use axum::{
    extract::Extension,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::applications::applications_routes;
use crate::common::AppState;
use crate::dashboard::dashboard_routes;
use crate::jobs::jobs_routes;
use crate::logging_middleware;

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Every route plus the logging and tracing layers. CORS is added
/// separately by [`cors_layer`].
pub fn build_router(state: AppState) -> Router {
    let shared = Arc::new(RwLock::new(state));

    Router::new()
        .route("/health", get(health))
        .merge(jobs_routes())
        .merge(applications_routes())
        .merge(dashboard_routes())
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(Extension(shared))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the admin dashboard origins, comma separated.
pub fn cors_layer(origins: &str) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
