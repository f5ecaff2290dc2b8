//! Shared types for the civic issue platform
//!
//! Domain model, unified error codes and API response structures used by
//! the server and (through JSON) by its clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
