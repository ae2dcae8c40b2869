//! API 路由模块
//!
//! 所有响应使用 [`ApiResponse`](shared::error::ApiResponse) 信封。
//! 顾客端接口位于 `/api/menu` 与 `/api/stores`，后台接口位于 `/api/admin`。
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`menu`] - 顾客扫码进入 (门店、菜单、桌台解析)
//! - [`stores`] - 门店管理
//! - [`products`] - 商品管理
//! - [`orders`] - 下单、订单状态、历史统计
//! - [`calls`] - 呼叫服务员/买单
//! - [`tables`] - 桌台二维码
//! - [`settlement`] - 整桌结账
//! - [`live`] - WebSocket 实时推送

pub mod calls;
pub mod health;
pub mod live;
pub mod menu;
pub mod orders;
pub mod products;
pub mod settlement;
pub mod stores;
pub mod tables;

use axum::{Router, middleware};
use serde::Deserialize;
use shared::live::SubscriptionScope;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::ServerState;

/// Build the Axum router (without state)
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        // Public APIs
        .merge(health::router())
        .merge(menu::router())
        .merge(live::router())
        // Ordering + staff APIs
        .merge(orders::router())
        .merge(calls::router())
        .merge(settlement::router())
        .merge(tables::router())
        .merge(stores::router())
        .merge(products::router())
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// `?table_no=` 查询参数：有则为桌台视图，无则为后台视图
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    pub table_no: Option<String>,
}

impl ScopeQuery {
    pub fn scope(self, store_id: i64) -> SubscriptionScope {
        match self.table_no.map(|t| t.trim().to_string()) {
            Some(table_no) if !table_no.is_empty() => SubscriptionScope::Table { store_id, table_no },
            _ => SubscriptionScope::Dashboard { store_id },
        }
    }
}
