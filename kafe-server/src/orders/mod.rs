//! Order Lifecycle Engine
//!
//! ```text
//! create ──► new ──► preparing ──► done ──► (settlement) paid
//! ```
//!
//! 所有状态变更都是条件更新，只能前进；重复或过期的请求是 no-op，
//! 不报错也不广播。每次成功写入后发布一条变更。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::live::{ChangeEvent, SubscriptionScope};
use shared::models::{
    AdvanceOutcome, AdvanceTarget, HISTORY_LIMIT, HistoryFilter, HistoryQuery, Order,
    OrderCreate, OrderHistory, OrderStatus,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{order, product};
use crate::tables::require_store;

/// Maximum number of orders a live view carries
pub const LIVE_ORDER_LIMIT: i64 = 100;

/// Place a customer order
///
/// The submission must be internally consistent (declared total equals the
/// sum of its lines). With canonical pricing enabled, names and unit prices
/// are replaced from the current product records before saving.
pub async fn create(
    state: &ServerState,
    store_id: i64,
    mut data: OrderCreate,
) -> AppResult<Order> {
    require_store(&state.pool, store_id).await?;
    data.validate()?;

    if state.config.verify_canonical_prices {
        reprice(&state.pool, store_id, &mut data).await?;
    }

    let order = Order {
        id: snowflake_id(),
        store_id,
        table_no: data.table_no.trim().to_string(),
        total_price: data.total_price,
        status: OrderStatus::New,
        items: data.items,
        created_at: now_millis(),
    };
    order::insert(&state.pool, &order).await?;

    tracing::info!(
        store_id,
        order_id = order.id,
        table_no = %order.table_no,
        total = order.total_price,
        "Order created"
    );

    state.publish(ChangeEvent::OrderInserted {
        order: order.clone(),
    });
    Ok(order)
}

async fn reprice(pool: &SqlitePool, store_id: i64, data: &mut OrderCreate) -> AppResult<()> {
    let products = product::find_by_store(pool, store_id).await?;
    for item in &mut data.items {
        let canonical = products
            .iter()
            .find(|p| p.id == item.product_id)
            .ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", item.product_id)
            })?;
        item.name = canonical.name.clone();
        item.unit_price = canonical.price;
    }

    let total = data.computed_total();
    if total != data.total_price {
        tracing::warn!(
            store_id,
            declared = data.total_price,
            canonical = total,
            "Order repriced from product records"
        );
    }
    data.total_price = total;
    Ok(())
}

/// Move an order forward to `target` (`preparing` or `done`)
///
/// Already at or past the target: returns the current order with
/// `changed = false` and publishes nothing.
pub async fn advance(
    state: &ServerState,
    store_id: i64,
    order_id: i64,
    target: OrderStatus,
) -> AppResult<AdvanceOutcome> {
    let target = AdvanceTarget::try_from(target)?.status();

    // 写入与发布在同一锁内，结账的 paid 事件不会被较早的状态追上
    let _write = state.hub.write_lock(store_id).await;
    if let Some(order) = order::advance(&state.pool, store_id, order_id, target).await? {
        tracing::info!(store_id, order_id, status = %order.status, "Order advanced");
        state.publish(ChangeEvent::OrderUpdated {
            order: order.clone(),
        });
        return Ok(AdvanceOutcome {
            order,
            changed: true,
        });
    }

    let order = order::find_by_id(&state.pool, store_id, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))?;
    tracing::debug!(
        store_id,
        order_id,
        current = %order.status,
        target = %target,
        "Advance ignored"
    );
    Ok(AdvanceOutcome {
        order,
        changed: false,
    })
}

/// Remove an order record (staff correction)
pub async fn delete(state: &ServerState, store_id: i64, order_id: i64) -> AppResult<Order> {
    let _write = state.hub.write_lock(store_id).await;
    let order = order::delete(&state.pool, store_id, order_id)
        .await?
        .ok_or_else(|| AppError::order_not_found(order_id))?;

    tracing::info!(store_id, order_id, table_no = %order.table_no, "Order deleted");

    state.publish(ChangeEvent::OrderDeleted {
        id: order.id,
        store_id,
        table_no: order.table_no.clone(),
    });
    Ok(order)
}

/// Unsettled orders visible to a scope, newest first
pub async fn list_live(pool: &SqlitePool, scope: &SubscriptionScope) -> AppResult<Vec<Order>> {
    let orders =
        order::find_live(pool, scope.store_id(), scope.table_no(), LIVE_ORDER_LIMIT).await?;
    Ok(orders)
}

/// Order history with revenue statistics over the filtered set
pub async fn history(
    pool: &SqlitePool,
    store_id: i64,
    query: HistoryQuery,
) -> AppResult<OrderHistory> {
    require_store(pool, store_id).await?;

    let since = query.range.start_millis(chrono::Utc::now());
    let (min_rank, max_rank) = match query.status {
        HistoryFilter::All => (OrderStatus::New.rank(), OrderStatus::Paid.rank()),
        HistoryFilter::Active => (OrderStatus::New.rank(), OrderStatus::Preparing.rank()),
        HistoryFilter::Completed => (OrderStatus::Done.rank(), OrderStatus::Paid.rank()),
    };

    let orders =
        order::find_history(pool, store_id, since, min_rank, max_rank, HISTORY_LIMIT).await?;
    Ok(OrderHistory::new(orders))
}
