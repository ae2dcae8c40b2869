//! Data models
//!
//! Shared between kafe-server and kafe-client (via API and the live feed).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are Snowflake `i64`, all timestamps are Unix milliseconds.

pub mod call;
pub mod history;
pub mod order;
pub mod product;
pub mod settlement;
pub mod store;
pub mod table;

// Re-exports
pub use call::*;
pub use history::*;
pub use order::*;
pub use product::*;
pub use settlement::*;
pub use store::*;
pub use table::*;
