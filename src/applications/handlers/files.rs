// src/applications/handlers/files.rs
//! Serving uploaded CVs by their stored name

use axum::{
    extract::{Extension, Path},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::applications::models::UploadedFile;
use crate::applications::store;
use crate::common::{ApiError, AppState};

enum Disposition {
    Inline,
    Attachment,
}

/// GET /api/jobs/download/:filename - Download a stored CV
pub async fn download_file(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve(state_lock, filename, Disposition::Attachment).await
}

/// GET /api/jobs/view/:filename - Display a stored CV inline
pub async fn view_file(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    serve(state_lock, filename, Disposition::Inline).await
}

async fn serve(
    state_lock: Arc<RwLock<AppState>>,
    filename: String,
    disposition: Disposition,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    debug!(filename = %filename, "File request");

    // Only names recorded at upload time are served, so arbitrary paths never
    // reach the filesystem.
    let Some(record) = store::find_uploaded_file(&state.db, &filename).await? else {
        return Ok(not_found());
    };

    let content = match tokio::fs::read(state.uploads_dir.join(&record.stored_name)).await {
        Ok(content) => content,
        Err(e) => {
            warn!(error = %e, stored_name = %record.stored_name, "Upload missing on disk");
            return Ok(not_found());
        }
    };

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, record.content_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&record, &disposition),
            ),
        ],
        content,
    )
        .into_response())
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}

fn content_disposition(record: &UploadedFile, disposition: &Disposition) -> String {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };
    // Quotes and control characters would break the header value
    let name: String = record
        .original_name
        .chars()
        .filter(|c| !c.is_control() && *c != '"' && *c != '\\')
        .collect();
    format!("{}; filename=\"{}\"", kind, name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(original_name: &str) -> UploadedFile {
        UploadedFile {
            stored_name: "x.pdf".to_string(),
            original_name: original_name.to_string(),
            content_type: "application/pdf".to_string(),
            size_bytes: 1,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition(&record("my \"cv\".pdf"), &Disposition::Attachment),
            "attachment; filename=\"my cv.pdf\""
        );
        assert_eq!(
            content_disposition(&record("cv.pdf"), &Disposition::Inline),
            "inline; filename=\"cv.pdf\""
        );
    }
}
