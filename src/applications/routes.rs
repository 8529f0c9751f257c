// src/applications/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use super::handlers::{self, files};

/// Uploads larger than this are rejected before reaching the handler.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Create the router for application intake and review
pub fn applications_routes() -> Router {
    Router::new()
        // Candidate submission
        .route(
            "/api/jobs/apply",
            post(handlers::submit_application).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Review routes
        .route("/api/jobs/applications", get(handlers::list_applications))
        .route(
            "/api/jobs/applications/bulk-email",
            post(handlers::send_bulk_email),
        )
        .route(
            "/api/jobs/applications/:id/status",
            patch(handlers::update_application_status),
        )
        .route(
            "/api/jobs/applications/:id/remarks",
            patch(handlers::update_application_remarks),
        )
        // File serving routes
        .route("/api/jobs/download/:filename", get(files::download_file))
        .route("/api/jobs/view/:filename", get(files::view_file))
}
