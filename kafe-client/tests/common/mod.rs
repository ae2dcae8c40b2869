//! Shared helpers: an in-process fake of the ordering API and a real server

#![allow(dead_code)]

use async_trait::async_trait;
use kafe_client::{ClientConfig, ClientResult, OrderingApi};
use kafe_server::api::build_app;
use kafe_server::{Config, ServerState};
use parking_lot::{Mutex, MutexGuard};
use shared::error::AppError;
use shared::models::{
    AdvanceOutcome, AdvanceTarget, Call, CallCreate, CallType, DismissOutcome, EntryParams,
    HistoryQuery, MenuEntry, Order, OrderCreate, OrderHistory, OrderStatus, Product,
    SettlementReport, Store, TableAccess,
};
use std::sync::Arc;
use std::time::Duration;

pub const STORE_ID: i64 = 1;

pub fn store() -> Store {
    Store {
        id: STORE_ID,
        name: "Kafe Moda".into(),
        slug: "moda".into(),
        logo_url: None,
        created_at: 0,
    }
}

pub fn products() -> Vec<Product> {
    let product = |id: i64, name: &str, price: f64, category: &str| Product {
        id,
        store_id: STORE_ID,
        name: name.into(),
        price,
        category: category.into(),
        image_url: None,
        description: None,
        created_at: 0,
    };
    vec![
        product(10, "Latte", 45.0, "Drinks"),
        product(11, "Türk Kahvesi", 35.0, "Drinks"),
        product(20, "Cheesecake", 60.0, "Desserts"),
    ]
}

#[derive(Default)]
pub struct MockState {
    pub table: Option<TableAccess>,
    pub orders: Vec<Order>,
    pub calls: Vec<Call>,
    pub next_id: i64,
    /// Next advance answers with this error
    pub fail_advance: Option<AppError>,
    /// Next settlement answers with this error
    pub fail_settle: Option<AppError>,
    /// Next order submission answers with this error
    pub fail_place_order: Option<AppError>,
}

/// In-process ordering API with the store's rules; clones share state
#[derive(Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockState>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry resolves to this table
    pub fn with_table(self, table_no: &str) -> Self {
        self.state().table = Some(TableAccess::Resolved {
            table_no: table_no.into(),
        });
        self
    }

    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock()
    }

    /// Seed an order directly, as if another client placed it
    pub fn seed_order(&self, table_no: &str, status: OrderStatus) -> Order {
        let mut state = self.state();
        state.next_id += 1;
        let order = Order {
            id: state.next_id,
            store_id: STORE_ID,
            table_no: table_no.into(),
            total_price: 45.0,
            status,
            items: vec![],
            created_at: state.next_id,
        };
        state.orders.push(order.clone());
        order
    }

    /// Seed an active waiter call
    pub fn seed_call(&self, table_no: &str) -> Call {
        let mut state = self.state();
        state.next_id += 1;
        let call = Call {
            id: state.next_id,
            store_id: STORE_ID,
            table_no: table_no.into(),
            call_type: CallType::Waiter,
            active: true,
            created_at: state.next_id,
        };
        state.calls.push(call.clone());
        call
    }
}

#[async_trait]
impl OrderingApi for MockApi {
    async fn enter(&self, slug: &str, _params: &EntryParams) -> ClientResult<MenuEntry> {
        if slug != store().slug {
            return Err(AppError::store_not_found(slug).into());
        }
        let table = self.state().table.clone().unwrap_or(TableAccess::Unresolved {
            reason: "unknown token".into(),
        });
        Ok(MenuEntry {
            store: store(),
            products: products(),
            table,
        })
    }

    async fn place_order(&self, store_id: i64, order: &OrderCreate) -> ClientResult<Order> {
        let mut state = self.state();
        if let Some(err) = state.fail_place_order.take() {
            return Err(err.into());
        }
        order.validate()?;
        state.next_id += 1;
        let created = Order {
            id: state.next_id,
            store_id,
            table_no: order.table_no.clone(),
            total_price: order.total_price,
            status: OrderStatus::New,
            items: order.items.clone(),
            created_at: state.next_id,
        };
        state.orders.push(created.clone());
        Ok(created)
    }

    async fn live_orders(&self, _store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Order>> {
        Ok(self
            .state()
            .orders
            .iter()
            .filter(|o| o.is_live() && table_no.is_none_or(|t| t == o.table_no))
            .cloned()
            .collect())
    }

    async fn create_call(&self, store_id: i64, call: &CallCreate) -> ClientResult<Call> {
        let mut state = self.state();
        state.next_id += 1;
        let created = Call {
            id: state.next_id,
            store_id,
            table_no: call.table_no.clone(),
            call_type: call.call_type,
            active: true,
            created_at: state.next_id,
        };
        state.calls.push(created.clone());
        Ok(created)
    }

    async fn active_calls(&self, _store_id: i64, table_no: Option<&str>) -> ClientResult<Vec<Call>> {
        Ok(self
            .state()
            .calls
            .iter()
            .filter(|c| c.active && table_no.is_none_or(|t| t == c.table_no))
            .cloned()
            .collect())
    }

    async fn store(&self, _store_id: i64) -> ClientResult<Store> {
        Ok(store())
    }

    async fn advance(
        &self,
        _store_id: i64,
        order_id: i64,
        target: OrderStatus,
    ) -> ClientResult<AdvanceOutcome> {
        let mut state = self.state();
        if let Some(err) = state.fail_advance.take() {
            return Err(err.into());
        }
        let target = AdvanceTarget::try_from(target)?.status();
        let order = state
            .orders
            .iter_mut()
            .find(|o| o.id == order_id)
            .ok_or_else(|| AppError::order_not_found(order_id))?;
        let changed = target > order.status;
        if changed {
            order.status = target;
        }
        Ok(AdvanceOutcome {
            order: order.clone(),
            changed,
        })
    }

    async fn delete_order(&self, _store_id: i64, order_id: i64) -> ClientResult<Order> {
        let mut state = self.state();
        let pos = state
            .orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| AppError::order_not_found(order_id))?;
        Ok(state.orders.remove(pos))
    }

    async fn dismiss_call(&self, _store_id: i64, call_id: i64) -> ClientResult<DismissOutcome> {
        let mut state = self.state();
        let call = state
            .calls
            .iter_mut()
            .find(|c| c.id == call_id)
            .ok_or_else(|| AppError::call_not_found(call_id))?;
        let changed = call.active;
        call.active = false;
        Ok(DismissOutcome {
            call: call.clone(),
            changed,
        })
    }

    async fn settle_table(&self, _store_id: i64, table_no: &str) -> ClientResult<SettlementReport> {
        let mut state = self.state();
        if let Some(err) = state.fail_settle.take() {
            return Err(err.into());
        }
        let mut report = SettlementReport {
            table_no: table_no.to_string(),
            ..Default::default()
        };
        for order in state
            .orders
            .iter_mut()
            .filter(|o| o.table_no == table_no && o.is_live())
        {
            order.status = OrderStatus::Paid;
            report.settled_orders.push(order.id);
        }
        for call in state
            .calls
            .iter_mut()
            .filter(|c| c.table_no == table_no && c.active)
        {
            call.active = false;
            report.dismissed_calls.push(call.id);
        }
        Ok(report)
    }

    async fn history(&self, _store_id: i64, query: HistoryQuery) -> ClientResult<OrderHistory> {
        let orders = self
            .state()
            .orders
            .iter()
            .filter(|o| query.status.admits(o.status))
            .cloned()
            .collect();
        Ok(OrderHistory::new(orders))
    }
}

/// kafe-server on an ephemeral port with an in-memory database
pub struct LiveServer {
    pub state: ServerState,
    pub base_url: String,
}

impl LiveServer {
    pub async fn start() -> Self {
        let state = ServerState::in_memory(Config::for_tests()).await.unwrap();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = build_app().with_state(state.clone());
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            state,
            base_url: format!("http://{addr}"),
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
            .with_timeout(5)
            .with_reconnect(Duration::from_millis(50), Duration::from_millis(200))
    }
}
