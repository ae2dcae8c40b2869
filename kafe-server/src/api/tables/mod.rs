//! Dining Table API 模块 (后台)

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/admin/stores/{store_id}/tables", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/rotate", post(handler::rotate_all))
        .route("/{table_no}/rotate", post(handler::rotate_one))
}
