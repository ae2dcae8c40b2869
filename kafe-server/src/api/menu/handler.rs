//! Menu API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ApiResponse;
use shared::models::{EntryParams, MenuEntry};

use crate::core::ServerState;
use crate::tables;
use crate::utils::{AppResult, ok};

/// GET /api/menu/{slug}?t=&table= - 门店、菜单与桌台解析结果
pub async fn enter(
    State(state): State<ServerState>,
    Path(slug): Path<String>,
    Query(params): Query<EntryParams>,
) -> AppResult<Json<ApiResponse<MenuEntry>>> {
    let entry = tables::enter(&state, &slug, &params).await?;
    Ok(ok(entry))
}
