//! Live WebSocket 模块
//!
//! GET /api/stores/{store_id}/live?table_no=
//!
//! 协议:
//! - Server → Client: LiveServerMessage (Ready, Change, Error)
//! - Client → Server: LiveClientCommand (Resync)

mod session;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stores/{store_id}/live", get(session::handle_live_ws))
}
