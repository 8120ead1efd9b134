//! Feedback Module
//!
//! Serves read-only views of the vehicle feedback file.
//!
//! ## Overview
//! The file is parsed once at startup into a [`types::FeedbackDataset`] and
//! shared by every request behind an `Arc`. Requests never touch the disk;
//! each one is a pure scan over the loaded rows.
//!
//! ## Submodules
//! - **`loader`**: CSV parsing into ordered, header-keyed records.
//! - **`engine`**: The filter operations (by model, by model/date/index, by summary criteria,
//!   by model/feature/sentiment).
//! - **`handlers`**: Axum handlers translating results into JSON responses.
//! - **`types`**: The record and dataset types plus query DTOs.

pub mod engine;
pub mod handlers;
pub mod loader;
pub mod types;
