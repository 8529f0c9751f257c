// src/jobs/validators.rs

use super::models::CreateJobRequest;
use crate::common::{ValidationResult, Validator};

pub struct JobValidator;

impl Validator<CreateJobRequest> for JobValidator {
    fn validate(&self, data: &CreateJobRequest) -> ValidationResult {
        let mut result = ValidationResult::new();

        result.require_text("title", Some(&data.title), "Job title is required");
        if data.title.len() > 255 {
            result.add_error("title", "Job title must be less than 255 characters");
        }

        if let Some(description) = &data.description {
            if description.len() > 10000 {
                result.add_error(
                    "description",
                    "Description must be less than 10000 characters",
                );
            }
        }

        if let Some(location) = &data.location {
            if location.len() > 255 {
                result.add_error("location", "Location must be less than 255 characters");
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_validator() {
        let valid = CreateJobRequest {
            title: "Backend Engineer".to_string(),
            ..Default::default()
        };
        assert!(JobValidator.validate(&valid).is_valid);

        let blank = CreateJobRequest {
            title: "  ".to_string(),
            ..Default::default()
        };
        let result = JobValidator.validate(&blank);
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].message, "Job title is required");

        let long_location = CreateJobRequest {
            title: "Engineer".to_string(),
            location: Some("x".repeat(256)),
            ..Default::default()
        };
        assert!(!JobValidator.validate(&long_location).is_valid);
    }
}
