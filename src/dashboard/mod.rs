// src/dashboard/mod.rs

pub mod handlers;
pub mod routes;

pub use routes::dashboard_routes;
