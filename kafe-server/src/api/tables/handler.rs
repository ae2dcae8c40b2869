//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::ApiResponse;
use shared::models::{RotateTables, TableEntry};

use crate::core::ServerState;
use crate::tables;
use crate::utils::{AppResult, ok};

/// GET /api/admin/stores/{store_id}/tables - 桌台及二维码地址
pub async fn list(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<TableEntry>>>> {
    let tables = tables::list_tables(&state, store_id).await?;
    Ok(ok(tables))
}

/// POST /api/admin/stores/{store_id}/tables/rotate - 重新生成 1..=count 的二维码
pub async fn rotate_all(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(payload): Json<RotateTables>,
) -> AppResult<Json<ApiResponse<Vec<TableEntry>>>> {
    let tables = tables::rotate_tokens(&state, store_id, payload.count).await?;
    Ok(ok(tables))
}

/// POST /api/admin/stores/{store_id}/tables/{table_no}/rotate - 重新生成单桌二维码
pub async fn rotate_one(
    State(state): State<ServerState>,
    Path((store_id, table_no)): Path<(i64, String)>,
) -> AppResult<Json<ApiResponse<TableEntry>>> {
    let table = tables::rotate_table(&state, store_id, &table_no).await?;
    Ok(ok(table))
}
