//! Shared types for the reservation service
//!
//! Domain models (tables, customers, reservations), the unified error
//! system and small utilities used by the server crate and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
