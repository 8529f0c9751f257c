// src/applications/handlers/mod.rs

pub mod bulk_email;
pub mod files;
pub mod review;
pub mod uploads;

// Re-export handler functions
pub use bulk_email::*;
pub use review::*;
pub use uploads::*;
