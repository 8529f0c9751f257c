// src/applications/store.rs
//! Persistence for application records and the uploaded-file mapping.

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

use super::models::{Application, ApplicationStatus, CandidatePayload, UploadedFile};

const APPLICATION_COLUMNS: &str = "id, name, email, mobile, qualification, skills, cv_url, \
     status, remarks, created_at, updated_at";

/// Insert a new application in `pending` state and return it.
pub async fn insert_application(
    pool: &SqlitePool,
    candidate: &CandidatePayload,
    cv_url: Option<&str>,
) -> Result<Application, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO applications
            (id, name, email, mobile, qualification, skills, cv_url, status, remarks, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&candidate.name)
    .bind(&candidate.email)
    .bind(&candidate.mobile)
    .bind(&candidate.qualification)
    .bind(&candidate.skills)
    .bind(cv_url)
    .bind(ApplicationStatus::Pending)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    find_application(pool, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

/// All applications, newest first, optionally restricted to one status.
pub async fn list_applications(
    pool: &SqlitePool,
    status: Option<ApplicationStatus>,
) -> Result<Vec<Application>, sqlx::Error> {
    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM applications",
        APPLICATION_COLUMNS
    ));
    if let Some(status) = status {
        query.push(" WHERE status = ").push_bind(status);
    }
    query.push(" ORDER BY created_at DESC, id");

    query.build_query_as::<Application>().fetch_all(pool).await
}

pub async fn find_application(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<Application>, sqlx::Error> {
    sqlx::query_as::<_, Application>(&format!(
        "SELECT {} FROM applications WHERE id = ?",
        APPLICATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Returns the updated record, or `None` if no application has this id.
pub async fn set_status(
    pool: &SqlitePool,
    id: &str,
    status: ApplicationStatus,
) -> Result<Option<Application>, sqlx::Error> {
    let result = sqlx::query("UPDATE applications SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_application(pool, id).await
}

/// Returns `false` if no application has this id.
pub async fn set_remarks(pool: &SqlitePool, id: &str, remarks: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE applications SET remarks = ?, updated_at = ? WHERE id = ?")
        .bind(remarks)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Non-blank email addresses of the given applications, one per record.
/// Unknown ids are ignored and duplicate ids collapse to one record.
pub async fn emails_for(pool: &SqlitePool, ids: &[String]) -> Result<Vec<String>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let mut query = QueryBuilder::<Sqlite>::new("SELECT email FROM applications WHERE id IN (");
    let mut separated = query.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY created_at, id");

    let emails: Vec<String> = query.build_query_scalar::<String>().fetch_all(pool).await?;

    Ok(emails
        .into_iter()
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())
        .collect())
}

pub async fn count_applications(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM applications")
        .fetch_one(pool)
        .await
}

pub async fn insert_uploaded_file(pool: &SqlitePool, file: &UploadedFile) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO uploaded_files (stored_name, original_name, content_type, size_bytes, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&file.stored_name)
    .bind(&file.original_name)
    .bind(&file.content_type)
    .bind(file.size_bytes)
    .bind(&file.created_at)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn find_uploaded_file(
    pool: &SqlitePool,
    stored_name: &str,
) -> Result<Option<UploadedFile>, sqlx::Error> {
    sqlx::query_as::<_, UploadedFile>(
        "SELECT stored_name, original_name, content_type, size_bytes, created_at \
         FROM uploaded_files WHERE stored_name = ?",
    )
    .bind(stored_name)
    .fetch_optional(pool)
    .await
}

pub async fn delete_uploaded_file(pool: &SqlitePool, stored_name: &str) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM uploaded_files WHERE stored_name = ?")
        .bind(stored_name)
        .execute(pool)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::migrations::run_migrations;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        run_migrations(&pool).await.unwrap();
        pool
    }

    fn candidate(name: &str, email: &str) -> CandidatePayload {
        CandidatePayload {
            name: name.to_string(),
            email: email.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_defaults_to_pending() {
        let pool = setup_test_db().await;
        let app = insert_application(&pool, &candidate("A", "a@x.com"), None)
            .await
            .unwrap();

        assert_eq!(app.status, ApplicationStatus::Pending);
        assert_eq!(app.remarks, "");
        assert!(app.cv_url.is_none());
        assert_eq!(count_applications(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_set_status_unknown_id_creates_nothing() {
        let pool = setup_test_db().await;
        let updated = set_status(&pool, "missing", ApplicationStatus::Accepted)
            .await
            .unwrap();

        assert!(updated.is_none());
        assert_eq!(count_applications(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_set_remarks_reports_missing_record() {
        let pool = setup_test_db().await;
        let app = insert_application(&pool, &candidate("A", "a@x.com"), None)
            .await
            .unwrap();

        assert!(set_remarks(&pool, &app.id, "strong SQL").await.unwrap());
        assert!(!set_remarks(&pool, "missing", "ignored").await.unwrap());

        let reloaded = find_application(&pool, &app.id).await.unwrap().unwrap();
        assert_eq!(reloaded.remarks, "strong SQL");
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let pool = setup_test_db().await;
        let a = insert_application(&pool, &candidate("A", "a@x.com"), None)
            .await
            .unwrap();
        insert_application(&pool, &candidate("B", "b@x.com"), None)
            .await
            .unwrap();
        set_status(&pool, &a.id, ApplicationStatus::Rejected)
            .await
            .unwrap();

        let all = list_applications(&pool, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let rejected = list_applications(&pool, Some(ApplicationStatus::Rejected))
            .await
            .unwrap();
        assert_eq!(rejected.len(), 1);
        assert_eq!(rejected[0].id, a.id);
    }

    #[tokio::test]
    async fn test_emails_for_skips_blank_and_unknown() {
        let pool = setup_test_db().await;
        let a = insert_application(&pool, &candidate("A", "a@x.com"), None)
            .await
            .unwrap();
        let blank = insert_application(&pool, &candidate("B", "  "), None)
            .await
            .unwrap();

        let emails = emails_for(
            &pool,
            &[a.id.clone(), a.id.clone(), blank.id, "missing".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(emails, vec!["a@x.com".to_string()]);
        assert!(emails_for(&pool, &[]).await.unwrap().is_empty());
    }
}
