//! 工具模块

pub mod logger;

use axum::Json;
use shared::error::ApiResponse;

pub use logger::{init_logger, init_logger_with_file};
pub use shared::error::{AppError, AppResult};

/// 包装成功响应
pub fn ok<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::success(data))
}
