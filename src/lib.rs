// src/lib.rs
//! Job-application intake and review API

pub mod app;
pub mod applications;
pub mod common;
pub mod dashboard;
pub mod jobs;
pub mod logging_middleware;
pub mod review;
pub mod services;

pub use app::{build_router, cors_layer};
