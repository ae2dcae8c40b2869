//! Menu API 模块 - 顾客扫码进入

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/menu/{slug}", get(handler::enter))
}
