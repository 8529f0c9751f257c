// src/jobs/handlers/postings.rs

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::common::{ApiError, AppState, Validator};
use crate::jobs::models::{CreateJobRequest, JobPosting};
use crate::jobs::validators::JobValidator;

/// GET /api/jobs - List job postings, newest first
pub async fn list_jobs(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<Vec<JobPosting>>, ApiError> {
    let state = state_lock.read().await.clone();

    let jobs = sqlx::query_as::<_, JobPosting>(
        "SELECT id, title, description, location, created_at FROM jobs ORDER BY created_at DESC, id",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(jobs))
}

/// POST /api/jobs - Create a job posting
pub async fn create_job(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<JobPosting>), ApiError> {
    let state = state_lock.read().await.clone();

    JobValidator.validate(&request).into_result()?;

    let job = JobPosting {
        id: Uuid::new_v4().to_string(),
        title: request.title.trim().to_string(),
        description: request.description.unwrap_or_default(),
        location: request.location.unwrap_or_default(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    sqlx::query(
        "INSERT INTO jobs (id, title, description, location, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&job.id)
    .bind(&job.title)
    .bind(&job.description)
    .bind(&job.location)
    .bind(&job.created_at)
    .execute(&state.db)
    .await?;

    info!(job_id = %job.id, title = %job.title, "Job posting created");

    Ok((StatusCode::CREATED, Json(job)))
}
