// src/common/migrations.rs
//! Database schema setup

use sqlx::SqlitePool;
use std::env;
use tracing::{info, warn};

/// Create every table and index the API needs.
///
/// Idempotent: tables are created if missing and never altered. Setting
/// `RESET_DB=true` drops everything first, which loses all stored records.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let should_reset_db = env::var("RESET_DB").unwrap_or_else(|_| "false".to_string()) == "true";

    if should_reset_db {
        warn!("RESET_DB=true - dropping all tables and recreating schema");
        drop_all_tables(pool).await?;
    }

    create_upload_tables(pool).await?;
    create_application_tables(pool).await?;
    create_job_tables(pool).await?;
    create_indexes(pool).await?;

    info!("Database schema ready");

    Ok(())
}

async fn drop_all_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Reverse dependency order
    for table in ["jobs", "applications", "uploaded_files"] {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table))
            .execute(pool)
            .await?;
    }

    Ok(())
}

async fn create_upload_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    // Maps the generated on-disk name back to what the candidate uploaded
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS uploaded_files (
            stored_name TEXT PRIMARY KEY,
            original_name TEXT NOT NULL,
            content_type TEXT NOT NULL,
            size_bytes INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_application_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL DEFAULT '',
            email TEXT NOT NULL DEFAULT '',
            mobile TEXT NOT NULL DEFAULT '',
            qualification TEXT NOT NULL DEFAULT '',
            skills TEXT NOT NULL DEFAULT '',
            cv_url TEXT REFERENCES uploaded_files(stored_name),
            status TEXT NOT NULL DEFAULT 'pending'
                CHECK (status IN ('pending', 'accepted', 'rejected')),
            remarks TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_job_tables(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_indexes(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let indexes = [
        "CREATE INDEX IF NOT EXISTS idx_applications_status ON applications(status)",
        "CREATE INDEX IF NOT EXISTS idx_applications_created_at ON applications(created_at)",
        "CREATE INDEX IF NOT EXISTS idx_jobs_created_at ON jobs(created_at)",
    ];

    for index_sql in indexes {
        sqlx::query(index_sql).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = setup_test_db().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert_eq!(tables, vec!["applications", "jobs", "uploaded_files"]);
    }

    #[tokio::test]
    async fn test_status_check_constraint() {
        let pool = setup_test_db().await;
        run_migrations(&pool).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO applications (id, status, created_at, updated_at) VALUES ('a', 'hired', '', '')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err(), "unknown status must be rejected by the store");

        sqlx::query("INSERT INTO applications (id, created_at, updated_at) VALUES ('b', '', '')")
            .execute(&pool)
            .await
            .unwrap();
        let status: String = sqlx::query_scalar("SELECT status FROM applications WHERE id = 'b'")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(status, "pending");
    }
}
