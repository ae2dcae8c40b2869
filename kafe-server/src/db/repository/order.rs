//! Order Repository
//!
//! Status changes are conditional single-statement updates, so two staff
//! devices racing on the same order cannot move it backwards.

use super::{RepoResult, STATUS_RANK_SQL};
use shared::models::{Order, OrderStatus};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

const ORDER_COLUMNS: &str = "id, store_id, table_no, total_price, status, items, created_at";

pub async fn insert(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO orders (id, store_id, table_no, total_price, status, items, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.store_id)
    .bind(&order.table_no)
    .bind(order.total_price)
    .bind(order.status)
    .bind(Json(&order.items))
    .bind(order.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ? AND store_id = ?");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Orders not yet settled, newest first, optionally for one table
pub async fn find_live(
    pool: &SqlitePool,
    store_id: i64,
    table_no: Option<&str>,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE store_id = ?1 AND status != 'paid' AND (?2 IS NULL OR table_no = ?2) \
         ORDER BY created_at DESC, id DESC LIMIT ?3"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(store_id)
        .bind(table_no)
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// History window: orders created at or after `since` whose status rank lies
/// in `min_rank..=max_rank`, newest first
pub async fn find_history(
    pool: &SqlitePool,
    store_id: i64,
    since: Option<i64>,
    min_rank: u8,
    max_rank: u8,
    limit: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE store_id = ?1 AND (?2 IS NULL OR created_at >= ?2) \
         AND {STATUS_RANK_SQL} BETWEEN ?3 AND ?4 \
         ORDER BY created_at DESC, id DESC LIMIT ?5"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(store_id)
        .bind(since)
        .bind(i64::from(min_rank))
        .bind(i64::from(max_rank))
        .bind(limit)
        .fetch_all(pool)
        .await?;
    Ok(orders)
}

/// Move an order forward to `target`
///
/// Returns the updated row, or `None` when the order is missing or is
/// already at or past `target`.
pub async fn advance(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    target: OrderStatus,
) -> RepoResult<Option<Order>> {
    let sql = format!(
        "UPDATE orders SET status = ? WHERE id = ? AND store_id = ? AND {STATUS_RANK_SQL} < ? \
         RETURNING {ORDER_COLUMNS}"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(target)
        .bind(id)
        .bind(store_id)
        .bind(i64::from(target.rank()))
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

pub async fn delete(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Order>> {
    let sql =
        format!("DELETE FROM orders WHERE id = ? AND store_id = ? RETURNING {ORDER_COLUMNS}");
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(order)
}

/// Mark every unpaid order of the table as paid, returning the changed rows
pub async fn settle_table(
    conn: &mut SqliteConnection,
    store_id: i64,
    table_no: &str,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "UPDATE orders SET status = 'paid' \
         WHERE store_id = ? AND table_no = ? AND status != 'paid' RETURNING {ORDER_COLUMNS}"
    );
    let orders = sqlx::query_as::<_, Order>(&sql)
        .bind(store_id)
        .bind(table_no)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}
