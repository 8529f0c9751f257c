// src/dashboard/handlers.rs

use axum::{extract::Extension, Json};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::error;

use crate::applications::store;
use crate::common::{ApiError, AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_applications: i64,
}

/// GET /api/dashboard/stats - Count every stored application
pub async fn get_dashboard_stats(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<DashboardStats>, ApiError> {
    let state = state_lock.read().await.clone();

    let total_applications = store::count_applications(&state.db).await.map_err(|e| {
        error!(error = %e, "Database error fetching total applications count");
        ApiError::InternalServer("Failed to fetch dashboard stats".to_string())
    })?;

    Ok(Json(DashboardStats { total_applications }))
}
