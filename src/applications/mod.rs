// src/applications/mod.rs

pub mod handlers;
pub mod models;
pub mod routes;
pub mod store;
pub mod validators;


// Re-export commonly used items
pub use models::{Application, ApplicationStatus};
pub use routes::applications_routes;
