//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use shared::error::ApiResponse;
use shared::models::{AdvanceOutcome, AdvanceRequest, HistoryQuery, Order, OrderCreate, OrderHistory};

use crate::api::ScopeQuery;
use crate::core::ServerState;
use crate::orders;
use crate::utils::{AppResult, ok};

/// POST /api/stores/{store_id}/orders - 顾客下单
pub async fn create(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = orders::create(&state, store_id, payload).await?;
    Ok(ok(order))
}

/// GET /api/stores/{store_id}/orders?table_no= - 未结账订单
pub async fn list_live(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<ScopeQuery>,
) -> AppResult<Json<ApiResponse<Vec<Order>>>> {
    let scope = query.scope(store_id);
    let orders = orders::list_live(&state.pool, &scope).await?;
    Ok(ok(orders))
}

/// POST /api/admin/stores/{store_id}/orders/{id}/advance - 推进状态
pub async fn advance(
    State(state): State<ServerState>,
    Path((store_id, id)): Path<(i64, i64)>,
    Json(payload): Json<AdvanceRequest>,
) -> AppResult<Json<ApiResponse<AdvanceOutcome>>> {
    let outcome = orders::advance(&state, store_id, id, payload.status).await?;
    Ok(ok(outcome))
}

/// DELETE /api/admin/stores/{store_id}/orders/{id} - 删除订单
pub async fn delete(
    State(state): State<ServerState>,
    Path((store_id, id)): Path<(i64, i64)>,
) -> AppResult<Json<ApiResponse<Order>>> {
    let order = orders::delete(&state, store_id, id).await?;
    Ok(ok(order))
}

/// GET /api/admin/stores/{store_id}/orders/history?status=&range= - 历史与统计
pub async fn history(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<ApiResponse<OrderHistory>>> {
    let history = orders::history(&state.pool, store_id, query).await?;
    Ok(ok(history))
}
