// src/applications/models.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

use crate::common::helpers::{
    deserialize_nullable_string, deserialize_skills, deserialize_string_list, deserialize_string_only,
};

// ============================================================================
// Application Models
// ============================================================================

/// Review outcome of an application. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 3] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = InvalidStatus;

    /// Exact, case-sensitive match on the stored spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: String,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub qualification: String,
    pub skills: String,
    /// Stored file key of the uploaded CV, if one was attached.
    pub cv_url: Option<String>,
    pub status: ApplicationStatus,
    pub remarks: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Candidate fields carried in the `data` part of an apply request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidatePayload {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub mobile: String,
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub qualification: String,
    #[serde(default, deserialize_with = "deserialize_skills")]
    pub skills: String,
}

#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub stored_name: String,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: String,
}

// ============================================================================
// Request / Response Models
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default, deserialize_with = "deserialize_string_only")]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusResponse {
    pub ok: bool,
    pub application: Application,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateRemarksRequest {
    #[serde(default, deserialize_with = "deserialize_nullable_string")]
    pub remarks: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BulkEmailRequest {
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub ids: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_only")]
    pub subject: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_only")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkEmailResponse {
    pub ok: bool,
    pub sent: usize,
    pub total: usize,
    pub preview_urls: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}
