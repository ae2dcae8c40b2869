//! Call Repository

use super::RepoResult;
use shared::models::Call;
use sqlx::{SqliteConnection, SqlitePool};

const CALL_COLUMNS: &str = "id, store_id, table_no, call_type, active, created_at";

pub async fn insert(pool: &SqlitePool, call: &Call) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO calls (id, store_id, table_no, call_type, active, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(call.id)
    .bind(call.store_id)
    .bind(&call.table_no)
    .bind(call.call_type)
    .bind(call.active)
    .bind(call.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Call>> {
    let sql = format!("SELECT {CALL_COLUMNS} FROM calls WHERE id = ? AND store_id = ?");
    let call = sqlx::query_as::<_, Call>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(call)
}

/// Active calls, newest first, optionally for one table
pub async fn find_active(
    pool: &SqlitePool,
    store_id: i64,
    table_no: Option<&str>,
) -> RepoResult<Vec<Call>> {
    let sql = format!(
        "SELECT {CALL_COLUMNS} FROM calls \
         WHERE store_id = ?1 AND active = 1 AND (?2 IS NULL OR table_no = ?2) \
         ORDER BY created_at DESC, id DESC"
    );
    let calls = sqlx::query_as::<_, Call>(&sql)
        .bind(store_id)
        .bind(table_no)
        .fetch_all(pool)
        .await?;
    Ok(calls)
}

/// Deactivate a call; `None` when it is missing or already inactive
pub async fn dismiss(pool: &SqlitePool, store_id: i64, id: i64) -> RepoResult<Option<Call>> {
    let sql = format!(
        "UPDATE calls SET active = 0 WHERE id = ? AND store_id = ? AND active = 1 \
         RETURNING {CALL_COLUMNS}"
    );
    let call = sqlx::query_as::<_, Call>(&sql)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(call)
}

/// Deactivate every active call of the table, returning the changed rows
pub async fn dismiss_table(
    conn: &mut SqliteConnection,
    store_id: i64,
    table_no: &str,
) -> RepoResult<Vec<Call>> {
    let sql = format!(
        "UPDATE calls SET active = 0 WHERE store_id = ? AND table_no = ? AND active = 1 \
         RETURNING {CALL_COLUMNS}"
    );
    let calls = sqlx::query_as::<_, Call>(&sql)
        .bind(store_id)
        .bind(table_no)
        .fetch_all(conn)
        .await?;
    Ok(calls)
}
