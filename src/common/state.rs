// Application state shared across all modules

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;

use crate::services::mailer::BulkNotifier;

/// Application state containing the database pool, upload directory and
/// the bulk notifier
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub uploads_dir: PathBuf,
    pub notifier: Arc<BulkNotifier>,
}
