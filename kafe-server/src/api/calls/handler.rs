//! Call API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ApiResponse;
use shared::models::{Call, CallCreate, DismissOutcome};

use crate::api::ScopeQuery;
use crate::calls;
use crate::core::ServerState;
use crate::utils::{AppResult, ok};

/// POST /api/stores/{store_id}/calls - 呼叫服务员/买单
pub async fn create(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(payload): Json<CallCreate>,
) -> AppResult<Json<ApiResponse<Call>>> {
    let call = calls::create(&state, store_id, payload).await?;
    Ok(ok(call))
}

/// GET /api/stores/{store_id}/calls?table_no= - 未处理的呼叫
pub async fn list_active(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<ScopeQuery>,
) -> AppResult<Json<ApiResponse<Vec<Call>>>> {
    let scope = query.scope(store_id);
    let calls = calls::list_active(&state.pool, &scope).await?;
    Ok(ok(calls))
}

/// POST /api/admin/stores/{store_id}/calls/{id}/dismiss - 处理呼叫
pub async fn dismiss(
    State(state): State<ServerState>,
    Path((store_id, id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<DismissOutcome>>> {
    let outcome = calls::dismiss(&state, store_id, id).await?;
    Ok(ok(outcome))
}
