// src/applications/handlers/review.rs

use axum::extract::{Extension, Json, Path, Query};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::applications::models::*;
use crate::applications::store;
use crate::common::{ApiError, AppState};

/// GET /api/jobs/applications - List applications, optionally by status
pub async fn list_applications(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Query(params): Query<ApplicationListQuery>,
) -> Result<Json<Vec<Application>>, ApiError> {
    let state = state_lock.read().await.clone();

    let status = match params.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(
            raw.parse::<ApplicationStatus>()
                .map_err(|_| ApiError::BadRequest("Invalid status".to_string()))?,
        ),
        None => None,
    };

    let applications = store::list_applications(&state.db, status).await?;
    Ok(Json(applications))
}

/// PATCH /api/jobs/applications/:id/status - Set the review outcome
pub async fn update_application_status(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    let status = request
        .status
        .as_deref()
        .and_then(|s| s.parse::<ApplicationStatus>().ok())
        .ok_or_else(|| {
            warn!(
                application_id = %application_id,
                requested = ?request.status,
                "Rejected invalid status update"
            );
            ApiError::BadRequest("Invalid status".to_string())
        })?;

    let application = store::set_status(&state.db, &application_id, status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    info!(
        application_id = %application_id,
        new_status = %status,
        "Application status updated"
    );

    Ok(Json(UpdateStatusResponse {
        ok: true,
        application,
    }))
}

/// PATCH /api/jobs/applications/:id/remarks - Replace reviewer remarks
pub async fn update_application_remarks(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(application_id): Path<String>,
    Json(request): Json<UpdateRemarksRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if !store::set_remarks(&state.db, &application_id, &request.remarks).await? {
        return Err(ApiError::NotFound("Application not found".to_string()));
    }

    info!(application_id = %application_id, "Application remarks updated");

    Ok(Json(MessageResponse::new("Remarks updated")))
}
