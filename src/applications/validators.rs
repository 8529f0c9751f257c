// src/applications/validators.rs

use super::models::BulkEmailRequest;
use crate::common::{ValidationResult, Validator};

pub struct BulkEmailValidator;

impl Validator<BulkEmailRequest> for BulkEmailValidator {
    fn validate(&self, data: &BulkEmailRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        if data.ids.iter().all(|id| id.trim().is_empty()) {
            result.add_error("ids", "No candidate IDs provided");
        }

        let subject_missing = data.subject.as_deref().map_or(true, |s| s.trim().is_empty());
        let message_missing = data.message.as_deref().map_or(true, |m| m.trim().is_empty());
        if subject_missing || message_missing {
            result.add_error("subject", "Subject and message are required");
        }

        result
    }
}
