//! Mediagate API Library
//!
//! This crate provides the HTTP handlers, service token guard and application setup.

mod handlers;

pub mod auth;
pub mod constants;
pub mod error;
pub mod setup;
pub mod state;
pub mod telemetry;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
