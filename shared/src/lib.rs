//! Shared types for the Kafe ordering platform
//!
//! Common types used by kafe-server and kafe-client: domain models and
//! their lifecycle rules, the error system, and the live change protocol.

pub mod error;
pub mod live;
pub mod models;
pub mod money;
pub mod util;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use http;
