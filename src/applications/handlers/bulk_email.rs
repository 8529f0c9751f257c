// src/applications/handlers/bulk_email.rs

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::applications::models::{BulkEmailRequest, BulkEmailResponse};
use crate::applications::store;
use crate::applications::validators::BulkEmailValidator;
use crate::common::{ApiError, AppState, Validator};

/// POST /api/jobs/applications/bulk-email - Email each selected candidate
///
/// Order: validate input, check that mail is configured at all, resolve
/// addresses, then acquire a transport. Partial delivery is still a 200 and
/// the counts tell the caller how many went out.
pub async fn send_bulk_email(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(request): Json<BulkEmailRequest>,
) -> Result<Json<BulkEmailResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    BulkEmailValidator.validate(&request).into_result()?;
    state.notifier.ensure_configured()?;

    let ids: Vec<String> = request
        .ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();

    let recipients = store::emails_for(&state.db, &ids).await?;
    if recipients.is_empty() {
        return Err(ApiError::BadRequest(
            "No valid email addresses found".to_string(),
        ));
    }

    info!(
        requested = ids.len(),
        recipients = recipients.len(),
        "Starting bulk email"
    );

    // Both fields were checked by the validator above
    let subject = request.subject.unwrap_or_default();
    let message = request.message.unwrap_or_default();

    let summary = state
        .notifier
        .notify(&recipients, &subject, &message)
        .await?;

    Ok(Json(BulkEmailResponse {
        ok: true,
        sent: summary.sent,
        total: summary.total,
        preview_urls: summary.preview_urls,
    }))
}
