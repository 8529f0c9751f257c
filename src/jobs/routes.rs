// src/jobs/routes.rs

use axum::{routing::get, Router};

use super::handlers;

/// Create the jobs router (placeholder job postings)
pub fn jobs_routes() -> Router {
    Router::new().route(
        "/api/jobs",
        get(handlers::list_jobs).post(handlers::create_job),
    )
}
