//! Order API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/stores/{store_id}/orders | POST | 顾客下单 |
//! | /api/stores/{store_id}/orders?table_no= | GET | 未结账订单 |
//! | /api/admin/stores/{store_id}/orders/{id}/advance | POST | 推进状态 |
//! | /api/admin/stores/{store_id}/orders/{id} | DELETE | 删除订单 |
//! | /api/admin/stores/{store_id}/orders/history | GET | 历史与统计 |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/stores/{store_id}/orders", public_routes())
        .nest("/api/admin/stores/{store_id}/orders", admin_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new().route("/", post(handler::create).get(handler::list_live))
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/history", get(handler::history))
        .route("/{id}", delete(handler::delete))
        .route("/{id}/advance", post(handler::advance))
}
