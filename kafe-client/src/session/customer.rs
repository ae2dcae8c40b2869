//! Customer session (顾客扫码点餐)
//!
//! ```text
//!  enter(slug, ?t=) ──► MenuEntry ──► menu / categories / cart
//!                          │ table resolved?
//!                          ├─ yes ──► place_order / call_staff / my_orders
//!                          └─ no  ──► browse only (NotResolved, re-scan)
//! ```

use shared::error::{AppError, ErrorCode};
use shared::live::{ChangeEvent, LiveSnapshot, SubscriptionScope};
use shared::models::{
    Call, CallCreate, CallType, EntryParams, MenuEntry, MenuFilter, Order, Product, Store,
    TableAccess, menu_categories,
};

use crate::api::OrderingApi;
use crate::cart::{CartItem, CartStorage, CartStore};
use crate::notice::Notice;
use crate::sync::{self, LiveState, SyncFrame};
use crate::{ClientError, ClientResult};

pub struct CustomerSession<A: OrderingApi, S: CartStorage> {
    api: A,
    cart: CartStore<S>,
    entry: Option<MenuEntry>,
    live: LiveState,
    /// Notices raised by this session's own writes
    notices: Vec<Notice>,
}

impl<A: OrderingApi, S: CartStorage> CustomerSession<A, S> {
    pub fn new(api: A, cart: CartStore<S>) -> Self {
        Self {
            api,
            cart,
            entry: None,
            live: LiveState::default(),
            notices: Vec::new(),
        }
    }

    /// Resolve the QR entry and load the table's live orders
    pub async fn enter(&mut self, slug: &str, params: &EntryParams) -> ClientResult<TableAccess> {
        let entry = self.api.enter(slug, params).await?;
        let access = entry.table.clone();

        if let TableAccess::Unresolved { reason } = &access {
            tracing::info!(slug, reason = %reason, "Menu opened without a table");
        }

        if let Err(e) = self.cart.bind_store(entry.store.id) {
            self.cart_save_failed(e);
        }
        self.live = LiveState {
            store: Some(entry.store.clone()),
            ..Default::default()
        };
        self.entry = Some(entry);

        if access.can_order() {
            self.refresh().await?;
        }
        Ok(access)
    }

    pub fn entry(&self) -> Option<&MenuEntry> {
        self.entry.as_ref()
    }

    /// Latest store record (live updates included)
    pub fn store(&self) -> Option<&Store> {
        self.live
            .store
            .as_ref()
            .or_else(|| self.entry.as_ref().map(|e| &e.store))
    }

    pub fn table_access(&self) -> Option<&TableAccess> {
        self.entry.as_ref().map(|e| &e.table)
    }

    pub fn table_no(&self) -> Option<&str> {
        self.table_access().and_then(TableAccess::table_no)
    }

    pub fn can_order(&self) -> bool {
        self.table_no().is_some()
    }

    /// Live feed scope, `None` until a table is known
    pub fn scope(&self) -> Option<SubscriptionScope> {
        let entry = self.entry.as_ref()?;
        Some(SubscriptionScope::Table {
            store_id: entry.store.id,
            table_no: entry.table.table_no()?.to_string(),
        })
    }

    pub fn menu(&self, filter: &MenuFilter) -> Vec<&Product> {
        match &self.entry {
            Some(entry) => filter.apply(&entry.products),
            None => Vec::new(),
        }
    }

    pub fn categories(&self) -> Vec<String> {
        match &self.entry {
            Some(entry) => menu_categories(&entry.products),
            None => Vec::new(),
        }
    }

    pub fn cart(&self) -> &CartStore<S> {
        &self.cart
    }

    pub fn cart_mut(&mut self) -> &mut CartStore<S> {
        &mut self.cart
    }

    /// Add a menu product to the cart
    pub fn add_to_cart(&mut self, product_id: i64, quantity: u32) -> ClientResult<()> {
        let entry = self.entry.as_ref().ok_or_else(ClientError::not_resolved)?;
        let product = entry
            .products
            .iter()
            .find(|p| p.id == product_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", product_id)
            })?;
        self.cart.add_item(product, quantity)
    }

    pub fn remove_from_cart(&mut self, product_id: i64) -> ClientResult<Option<CartItem>> {
        self.cart.remove_item(product_id)
    }

    /// Submit the cart as one order
    ///
    /// The cart is cleared only once the store accepted the order.
    pub async fn place_order(&mut self) -> ClientResult<Order> {
        let scope = self.scope().ok_or_else(ClientError::not_resolved)?;
        let table_no = scope.table_no().unwrap_or_default().to_string();
        let submission = self.cart.checkout(&table_no)?;

        let order = self.api.place_order(scope.store_id(), &submission).await?;
        tracing::info!(order_id = order.id, table_no = %order.table_no, "Order placed");
        // 订单已被接受，清空购物车失败不影响结果
        if let Err(e) = self.cart.clear() {
            self.cart_save_failed(e);
        }

        self.apply_local(
            &scope,
            &ChangeEvent::OrderInserted {
                order: order.clone(),
            },
        );
        if let Err(e) = self.refresh().await {
            tracing::warn!(error = %e, "Refetch after order failed");
        }
        Ok(order)
    }

    /// Call a waiter or ask for the bill
    pub async fn call_staff(&mut self, call_type: CallType) -> ClientResult<Call> {
        let scope = self.scope().ok_or_else(ClientError::not_resolved)?;
        let request = CallCreate {
            table_no: scope.table_no().unwrap_or_default().to_string(),
            call_type,
        };
        let call = self.api.create_call(scope.store_id(), &request).await?;
        self.apply_local(&scope, &ChangeEvent::CallInserted { call: call.clone() });
        Ok(call)
    }

    /// This table's unpaid orders, newest first
    pub fn my_orders(&self) -> &[Order] {
        &self.live.orders
    }

    pub fn active_calls(&self) -> &[Call] {
        &self.live.calls
    }

    /// Feed one live frame; returns the notices it raised
    pub fn apply_frame(&mut self, frame: &SyncFrame) -> Vec<Notice> {
        let Some(scope) = self.scope() else {
            return Vec::new();
        };
        let (live, notices) = sync::apply_frame(std::mem::take(&mut self.live), &scope, frame);
        self.live = live;
        notices
    }

    /// Refetch the table's live orders and calls
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let scope = self.scope().ok_or_else(ClientError::not_resolved)?;
        let store = match self.store() {
            Some(store) => store.clone(),
            None => return Err(ClientError::not_resolved()),
        };
        let orders = self
            .api
            .live_orders(scope.store_id(), scope.table_no())
            .await?;
        let calls = self
            .api
            .active_calls(scope.store_id(), scope.table_no())
            .await?;
        self.live = sync::apply_snapshot(LiveSnapshot {
            store,
            orders,
            calls,
            seq: self.live.seq,
        });
        Ok(())
    }

    fn cart_save_failed(&mut self, err: ClientError) {
        tracing::warn!(error = %err, "Cart change not saved");
        self.notices.push(Notice::WriteFailed {
            message: err.to_string(),
        });
    }

    /// Drain notices raised by writes
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    fn apply_local(&mut self, scope: &SubscriptionScope, event: &ChangeEvent) {
        let (live, notices) = sync::reduce(std::mem::take(&mut self.live), scope, event);
        self.live = live;
        self.notices.extend(notices);
    }
}
