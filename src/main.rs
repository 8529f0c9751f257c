// src/main.rs
use dotenv::dotenv;
use reqwest::Client;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::env;
use std::path::PathBuf;
use std::{net::SocketAddr, str::FromStr, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use intake_api::common::{migrations, AppState};
use intake_api::services::{BulkNotifier, MailerConfig, SmtpMailerProvider};
use intake_api::{build_router, cors_layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://intake.db".to_string());
    let uploads_dir = env::var("UPLOADS_DIR").unwrap_or_else(|_| "./uploads".to_string());
    let cors_origins = env::var("CORS_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string());
    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let mailer_config = MailerConfig::from_env();
    info!(
        mode = mailer_config.mode(),
        send_timeout_secs = mailer_config.send_timeout.as_secs(),
        "Bulk email transport configured"
    );

    // ========================================================================
    // STORAGE SETUP
    // ========================================================================

    tokio::fs::create_dir_all(&uploads_dir).await?;

    if let Some(path_part) = database_url.strip_prefix("sqlite://") {
        let path_without_params = path_part.split('?').next().unwrap_or("");
        if !path_without_params.is_empty() && !path_without_params.starts_with(':') {
            if let Some(parent) = PathBuf::from(path_without_params).parent() {
                if !parent.as_os_str().is_empty() {
                    tokio::fs::create_dir_all(parent).await?;
                }
            }
        }
    }

    let connect_options = SqliteConnectOptions::from_str(&database_url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    migrations::run_migrations(&pool).await?;

    // ========================================================================
    // SERVICES AND STATE
    // ========================================================================

    let http_client = Client::builder().build()?;
    let send_timeout = mailer_config.send_timeout;
    let provider = Arc::new(SmtpMailerProvider::new(mailer_config, http_client));
    let notifier = Arc::new(BulkNotifier::new(provider, send_timeout));

    let app_state = AppState {
        db: pool,
        uploads_dir: PathBuf::from(uploads_dir),
        notifier,
    };

    let app = build_router(app_state).layer(cors_layer(&cors_origins));

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
