//! Repository Module
//!
//! CRUD operations over the SQLite tables, one module per table. Functions
//! that must run inside a caller's transaction take `&mut SqliteConnection`
//! (pass `&mut *tx`); `table::upsert_token` takes any executor. Everything
//! else takes the pool.

pub mod call;
pub mod order;
pub mod product;
pub mod store;
pub mod table;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::conflict(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => AppError::database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// Status ranking
// =============================================================================
//
// 订单状态按生命周期排序 (new < preparing < done < paid)，
// 条件更新用 rank 比较保证状态只前进不后退:
//   UPDATE orders SET status = ? WHERE id = ? AND <rank(status)> < <rank(target)>

/// SQL expression ranking the `status` column
pub(crate) const STATUS_RANK_SQL: &str =
    "(CASE status WHEN 'new' THEN 0 WHEN 'preparing' THEN 1 WHEN 'done' THEN 2 ELSE 3 END)";
