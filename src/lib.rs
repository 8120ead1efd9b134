//! Vehicle Feedback API Library
//!
//! This library crate defines the modules behind the feedback HTTP service.
//! It serves as the foundation for the binary executable (`main.rs`).
//!
//! ## Architecture Modules
//! The service is composed of a few small subsystems:
//!
//! - **`feedback`**: Loads the delimited feedback file once at startup and answers
//!   filtered views of it (by model, date, brand, category, feature, sentiment).
//! - **`auth`**: Username/password signup and signin. Passwords are stored as salted
//!   hashes in a remote document store (Firestore) keyed by email.
//! - **`server`**: Router assembly, CORS, panic fallback and graceful shutdown.
//! - **`config`**: Environment-driven settings.
//! - **`error`**: Mapping of failures to HTTP status codes and JSON bodies.

pub mod auth;
pub mod config;
pub mod error;
pub mod feedback;
pub mod server;
