//! Ordering API seam
//!
//! Sessions talk to the central store through [`OrderingApi`], implemented
//! over HTTP by [`HttpClient`]. Tests substitute an in-process fake.

use async_trait::async_trait;
use shared::models::{
    AdvanceOutcome, AdvanceRequest, Call, CallCreate, DismissOutcome, EntryParams, HistoryQuery,
    MenuEntry, Order, OrderCreate, OrderHistory, OrderStatus, SettlementReport, Store,
};

use crate::{ClientResult, HttpClient};

#[async_trait]
pub trait OrderingApi: Send + Sync {
    // ========== Customer ==========

    /// Resolve the QR entry: store, menu and table access
    async fn enter(&self, slug: &str, params: &EntryParams) -> ClientResult<MenuEntry>;

    async fn place_order(&self, store_id: i64, order: &OrderCreate) -> ClientResult<Order>;

    /// Non-paid orders of the store, optionally of one table
    async fn live_orders(&self, store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Order>>;

    async fn create_call(&self, store_id: i64, call: &CallCreate) -> ClientResult<Call>;

    /// Active calls of the store, optionally of one table
    async fn active_calls(&self, store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Call>>;

    // ========== Staff ==========

    async fn store(&self, store_id: i64) -> ClientResult<Store>;

    async fn advance(
        &self,
        store_id: i64,
        order_id: i64,
        target: OrderStatus,
    ) -> ClientResult<AdvanceOutcome>;

    async fn delete_order(&self, store_id: i64, order_id: i64) -> ClientResult<Order>;

    async fn dismiss_call(&self, store_id: i64, call_id: i64) -> ClientResult<DismissOutcome>;

    async fn settle_table(&self, store_id: i64, table_no: &str) -> ClientResult<SettlementReport>;

    async fn history(&self, store_id: i64, query: HistoryQuery) -> ClientResult<OrderHistory>;
}

#[async_trait]
impl OrderingApi for HttpClient {
    async fn enter(&self, slug: &str, params: &EntryParams) -> ClientResult<MenuEntry> {
        self.get_query(&["api", "menu", slug], params).await
    }

    async fn place_order(&self, store_id: i64, order: &OrderCreate) -> ClientResult<Order> {
        let id = store_id.to_string();
        self.post(&["api", "stores", &id, "orders"], order).await
    }

    async fn live_orders(&self, store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Order>> {
        let id = store_id.to_string();
        self.get_scoped(&["api", "stores", &id, "orders"], table_no)
            .await
    }

    async fn create_call(&self, store_id: i64, call: &CallCreate) -> ClientResult<Call> {
        let id = store_id.to_string();
        self.post(&["api", "stores", &id, "calls"], call).await
    }

    async fn active_calls(&self, store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Call>> {
        let id = store_id.to_string();
        self.get_scoped(&["api", "stores", &id, "calls"], table_no)
            .await
    }

    async fn store(&self, store_id: i64) -> ClientResult<Store> {
        let id = store_id.to_string();
        self.get(&["api", "admin", "stores", &id]).await
    }

    async fn advance(
        &self,
        store_id: i64,
        order_id: i64,
        target: OrderStatus,
    ) -> ClientResult<AdvanceOutcome> {
        let id = store_id.to_string();
        let oid = order_id.to_string();
        self.post(
            &["api", "admin", "stores", &id, "orders", &oid, "advance"],
            &AdvanceRequest { status: target },
        )
        .await
    }

    async fn delete_order(&self, store_id: i64, order_id: i64) -> ClientResult<Order> {
        let id = store_id.to_string();
        let oid = order_id.to_string();
        self.delete(&["api", "admin", "stores", &id, "orders", &oid])
            .await
    }

    async fn dismiss_call(&self, store_id: i64, call_id: i64) -> ClientResult<DismissOutcome> {
        let id = store_id.to_string();
        let cid = call_id.to_string();
        self.post_empty(&["api", "admin", "stores", &id, "calls", &cid, "dismiss"])
            .await
    }

    async fn settle_table(&self, store_id: i64, table_no: &str) -> ClientResult<SettlementReport> {
        let id = store_id.to_string();
        self.post_empty(&["api", "admin", "stores", &id, "tables", table_no, "settle"])
            .await
    }

    async fn history(&self, store_id: i64, query: HistoryQuery) -> ClientResult<OrderHistory> {
        let id = store_id.to_string();
        self.get_query(&["api", "admin", "stores", &id, "orders", "history"], &query)
            .await
    }
}
