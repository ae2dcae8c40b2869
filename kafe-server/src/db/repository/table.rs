//! Dining Table Repository

use super::RepoResult;
use shared::models::DiningTable;
use sqlx::SqlitePool;
use sqlx::sqlite::SqliteExecutor;

/// Look up the table a QR token currently points at
pub async fn find_by_token(
    pool: &SqlitePool,
    store_id: i64,
    token: &str,
) -> RepoResult<Option<DiningTable>> {
    let table = sqlx::query_as::<_, DiningTable>(
        "SELECT store_id, table_no, qr_token FROM dining_tables WHERE qr_token = ? AND store_id = ?",
    )
    .bind(token)
    .bind(store_id)
    .fetch_optional(pool)
    .await?;
    Ok(table)
}

pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<DiningTable>> {
    let tables = sqlx::query_as::<_, DiningTable>(
        "SELECT store_id, table_no, qr_token FROM dining_tables WHERE store_id = ?",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(tables)
}

/// Number of tokenized tables of a store
pub async fn count_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<i64> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM dining_tables WHERE store_id = ?")
        .bind(store_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Insert the table or replace its token
///
/// The old token stops resolving as soon as this row is written. Runs on the
/// pool or inside a caller's transaction.
pub async fn upsert_token<'e>(
    conn: impl SqliteExecutor<'e>,
    store_id: i64,
    table_no: &str,
    token: &str,
) -> RepoResult<DiningTable> {
    let table = sqlx::query_as::<_, DiningTable>(
        "INSERT INTO dining_tables (store_id, table_no, qr_token) VALUES (?, ?, ?) \
         ON CONFLICT(store_id, table_no) DO UPDATE SET qr_token = excluded.qr_token \
         RETURNING store_id, table_no, qr_token",
    )
    .bind(store_id)
    .bind(table_no)
    .bind(token)
    .fetch_one(conn)
    .await?;
    Ok(table)
}
