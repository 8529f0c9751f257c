// src/jobs/handlers/mod.rs

pub mod postings;

pub use postings::*;
