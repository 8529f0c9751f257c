// src/dashboard/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn dashboard_routes() -> Router {
    Router::new().route("/api/dashboard/stats", get(handlers::get_dashboard_stats))
}
