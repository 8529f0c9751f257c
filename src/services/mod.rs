// src/services/mod.rs
//
// Shared services used by the domain modules

pub mod mailer;
pub mod smtp;

// Re-export commonly used types for convenience
pub use mailer::{BulkNotifier, BulkSendSummary, MailError, MailerConfig, MailerProvider};
pub use smtp::SmtpMailerProvider;
