// src/review/mod.rs
//! Admin dashboard state: remarks editing, selection and filtering.

pub mod board;

pub use board::{BoardFilter, RemarksUpdate, ReviewBoard, RowMode};
