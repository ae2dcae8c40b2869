//! 购物车 (Cart Store)
//!
//! ```text
//!  add_item ──┐
//!  remove ────┼──► CartState ──► persist (CartStorage)
//!  clear ─────┘        │
//!                      └──► checkout(table_no) ──► OrderCreate (lines + total, one snapshot)
//! ```
//!
//! Adding a product already in the cart increases that line's quantity; a
//! cart never holds two lines for the same product. The total is always
//! recomputed from the lines.
//!
//! Every mutation is saved before it returns. A failed save is returned to
//! the caller; the in-memory cart keeps the change so the next successful
//! save catches the storage up.

mod storage;

pub use storage::{CartStorage, FileCartStorage, MemoryCartStorage};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shared::error::{AppError, ErrorCode};
use shared::models::{OrderCreate, OrderItem, Product};
use shared::money;

use crate::ClientResult;

/// One cart line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: u32,
}

/// Persisted cart contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartState {
    /// Store the lines were picked from
    pub store_id: Option<i64>,
    pub items: Vec<CartItem>,
}

/// Injectable cart container
pub struct CartStore<S: CartStorage> {
    storage: S,
    state: CartState,
}

impl<S: CartStorage> CartStore<S> {
    /// Empty cart, nothing restored
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            state: CartState::default(),
        }
    }

    /// Cart restored from storage; unreadable state loads as empty
    pub fn load(storage: S) -> Self {
        let state = match storage.load() {
            Ok(state) => state.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Stored cart unreadable, starting empty");
                CartState::default()
            }
        };
        Self { storage, state }
    }

    pub fn items(&self) -> &[CartItem] {
        &self.state.items
    }

    pub fn is_empty(&self) -> bool {
        self.state.items.is_empty()
    }

    /// Number of units across all lines
    pub fn item_count(&self) -> u32 {
        self.state.items.iter().map(|i| i.quantity).sum()
    }

    pub fn total(&self) -> Decimal {
        money::sum_lines(self.state.items.iter().map(|i| (i.unit_price, i.quantity)))
    }

    pub fn store_id(&self) -> Option<i64> {
        self.state.store_id
    }

    /// Attach the cart to a store; lines picked in another store are dropped
    pub fn bind_store(&mut self, store_id: i64) -> ClientResult<()> {
        if self.state.store_id == Some(store_id) {
            return Ok(());
        }
        if !self.state.items.is_empty() {
            tracing::info!(
                from = ?self.state.store_id,
                to = store_id,
                "Cart belongs to another store, clearing"
            );
        }
        self.state = CartState {
            store_id: Some(store_id),
            items: Vec::new(),
        };
        self.persist()
    }

    pub fn add_item(&mut self, product: &Product, quantity: u32) -> ClientResult<()> {
        if quantity == 0 {
            return Err(AppError::new(ErrorCode::OrderInvalidQuantity)
                .with_detail("product_id", product.id)
                .into());
        }
        match self
            .state
            .items
            .iter_mut()
            .find(|i| i.product_id == product.id)
        {
            Some(line) => line.quantity = line.quantity.saturating_add(quantity),
            None => self.state.items.push(CartItem {
                product_id: product.id,
                name: product.name.clone(),
                unit_price: product.price,
                quantity,
            }),
        }
        self.persist()
    }

    /// Drop a whole line
    pub fn remove_item(&mut self, product_id: i64) -> ClientResult<Option<CartItem>> {
        let Some(pos) = self
            .state
            .items
            .iter()
            .position(|i| i.product_id == product_id)
        else {
            return Ok(None);
        };
        let removed = self.state.items.remove(pos);
        self.persist()?;
        Ok(Some(removed))
    }

    pub fn clear(&mut self) -> ClientResult<()> {
        if self.state.items.is_empty() {
            return Ok(());
        }
        self.state.items.clear();
        self.persist()
    }

    /// Order submission built from the current lines and their total
    pub fn checkout(&self, table_no: &str) -> ClientResult<OrderCreate> {
        if self.state.items.is_empty() {
            return Err(AppError::new(ErrorCode::OrderEmpty).into());
        }
        let items = self
            .state
            .items
            .iter()
            .map(|i| OrderItem {
                product_id: i.product_id,
                name: i.name.clone(),
                quantity: i.quantity,
                unit_price: i.unit_price,
            })
            .collect();
        Ok(OrderCreate {
            table_no: table_no.to_string(),
            items,
            total_price: money::to_f64(self.total()),
        })
    }

    fn persist(&self) -> ClientResult<()> {
        self.storage.save(&self.state).inspect_err(|e| {
            tracing::warn!(error = %e, "Failed to persist cart");
        })
    }
}
