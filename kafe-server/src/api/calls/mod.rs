//! Call API 模块

mod handler;

use axum::{Router, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .nest("/api/stores/{store_id}/calls", public_routes())
        .nest("/api/admin/stores/{store_id}/calls", admin_routes())
}

fn public_routes() -> Router<ServerState> {
    Router::new().route("/", post(handler::create).get(handler::list_active))
}

fn admin_routes() -> Router<ServerState> {
    Router::new().route("/{id}/dismiss", post(handler::dismiss))
}
