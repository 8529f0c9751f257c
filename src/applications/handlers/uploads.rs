// src/applications/handlers/uploads.rs
//! Candidate submission: multipart `data` (JSON) plus an optional `cv` file.

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::Json,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::applications::models::{CandidatePayload, MessageResponse, UploadedFile};
use crate::applications::store;
use crate::common::{safe_email_log, ApiError, AppState};

struct CvPart {
    original_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// POST /api/jobs/apply - Submit an application with an optional CV
pub async fn submit_application(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let state = state_lock.read().await.clone();

    let mut data: Option<String> = None;
    let mut cv: Option<CvPart> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InternalServer(e.to_string()))?
    {
        match field.name() {
            Some("data") => {
                data = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::InternalServer(e.to_string()))?,
                );
            }
            Some("cv") => {
                let original_name = field.file_name().unwrap_or("cv").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::InternalServer(e.to_string()))?;
                cv = Some(CvPart {
                    original_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let raw = data.ok_or_else(|| ApiError::InternalServer("Missing application data".to_string()))?;
    let candidate: CandidatePayload =
        serde_json::from_str(&raw).map_err(|e| ApiError::InternalServer(e.to_string()))?;

    let stored = match cv {
        Some(part) => Some(store_cv(&state, part).await?),
        None => None,
    };

    let application =
        match store::insert_application(&state.db, &candidate, stored.as_deref()).await {
            Ok(application) => application,
            Err(e) => {
                if let Some(name) = &stored {
                    discard_cv(&state, name).await;
                }
                return Err(ApiError::DatabaseError(e));
            }
        };

    info!(
        application_id = %application.id,
        email = %safe_email_log(&application.email),
        has_cv = application.cv_url.is_some(),
        "Application submitted"
    );

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("Application submitted!")),
    ))
}

/// Writes the file under a fresh UUID name and records the mapping.
/// Returns the stored name used as the application's `cv_url`.
async fn store_cv(state: &AppState, part: CvPart) -> Result<String, ApiError> {
    let stored_name = match safe_extension(&part.original_name) {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    };
    let file_path = state.uploads_dir.join(&stored_name);

    tokio::fs::write(&file_path, &part.bytes).await.map_err(|e| {
        error!(error = %e, path = %file_path.display(), "Failed to save uploaded CV");
        ApiError::InternalServer(format!("Failed to save file: {}", e))
    })?;

    let record = UploadedFile {
        stored_name: stored_name.clone(),
        original_name: part.original_name,
        content_type: part.content_type,
        size_bytes: part.bytes.len() as i64,
        created_at: chrono::Utc::now().to_rfc3339(),
    };

    if let Err(e) = store::insert_uploaded_file(&state.db, &record).await {
        remove_file_quietly(&file_path).await;
        return Err(ApiError::DatabaseError(e));
    }

    Ok(stored_name)
}

async fn discard_cv(state: &AppState, stored_name: &str) {
    remove_file_quietly(&state.uploads_dir.join(stored_name)).await;
    if let Err(e) = store::delete_uploaded_file(&state.db, stored_name).await {
        warn!(error = %e, stored_name = %stored_name, "Failed to delete upload mapping");
    }
}

async fn remove_file_quietly(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(error = %e, path = %path.display(), "Failed to remove orphaned upload");
    }
}

/// Lowercased alphanumeric extension of at most 8 characters.
fn safe_extension(file_name: &str) -> Option<String> {
    let ext = Path::new(file_name).extension()?.to_str()?;
    if ext.is_empty() || ext.len() > 8 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_extension() {
        assert_eq!(safe_extension("resume.PDF"), Some("pdf".to_string()));
        assert_eq!(safe_extension("archive.tar.gz"), Some("gz".to_string()));
        assert_eq!(safe_extension("no_extension"), None);
        assert_eq!(safe_extension("evil.p/hp"), None);
        assert_eq!(safe_extension("weird.ex$e"), None);
        assert_eq!(safe_extension("long.abcdefghij"), None);
    }
}
