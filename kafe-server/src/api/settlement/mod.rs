//! Settlement API 模块 (后台)

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use shared::error::ApiResponse;
use shared::models::SettlementReport;

use crate::core::ServerState;
use crate::settlement;
use crate::utils::{AppResult, ok};

pub fn router() -> Router<ServerState> {
    Router::new().route(
        "/api/admin/stores/{store_id}/tables/{table_no}/settle",
        post(settle),
    )
}

/// POST /api/admin/stores/{store_id}/tables/{table_no}/settle - 整桌结账
async fn settle(
    State(state): State<ServerState>,
    Path((store_id, table_no)): Path<(i64, String)>,
) -> AppResult<Json<ApiResponse<SettlementReport>>> {
    let report = settlement::settle_table(&state, store_id, &table_no).await?;
    Ok(ok(report))
}
