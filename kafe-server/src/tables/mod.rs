//! Token Resolver - 桌台二维码解析与轮换
//!
//! 顾客扫码进入 `{base}/{slug}?t={token}`，token 在进入时解析一次得到桌号，
//! 之后会话只携带桌号。轮换直接覆盖 token，旧二维码立即失效。

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    DiningTable, EntryParams, MenuEntry, Store, TableAccess, TableEntry, compare_table_no,
    entry_url,
};
use shared::util::new_qr_token;
use sqlx::SqlitePool;

use crate::core::ServerState;
use crate::db::repository::{product, store, table};

/// Upper bound of a bulk rotation
pub const MAX_TABLES: u32 = 500;
/// Upper bound of a table number label
pub const MAX_TABLE_NO_LEN: usize = 32;

/// Resolve a QR token to the table number it currently points at
pub async fn resolve_token(
    pool: &SqlitePool,
    store_id: i64,
    token: &str,
) -> AppResult<Option<String>> {
    let token = token.trim();
    if token.is_empty() {
        return Ok(None);
    }
    let found = table::find_by_token(pool, store_id, token).await?;
    Ok(found.map(|t| t.table_no))
}

/// Session entry: store, menu and what the session knows about its table
pub async fn enter(state: &ServerState, slug: &str, params: &EntryParams) -> AppResult<MenuEntry> {
    let store = store::find_by_slug(&state.pool, slug)
        .await?
        .ok_or_else(|| AppError::store_not_found(slug))?;
    let products = product::find_by_store(&state.pool, store.id).await?;
    let table = table_access(state, &store, params).await?;

    tracing::info!(
        store_id = store.id,
        access = ?table,
        "Customer session entered"
    );

    Ok(MenuEntry {
        store,
        products,
        table,
    })
}

async fn table_access(
    state: &ServerState,
    store: &Store,
    params: &EntryParams,
) -> AppResult<TableAccess> {
    let token = params.t.as_deref().map(str::trim).filter(|t| !t.is_empty());
    if let Some(token) = token {
        return Ok(match resolve_token(&state.pool, store.id, token).await? {
            Some(table_no) => TableAccess::Resolved { table_no },
            None => TableAccess::Unresolved {
                reason: ErrorCode::TableTokenInvalid.message().to_string(),
            },
        });
    }

    let legacy = params
        .table
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());
    let Some(table_no) = legacy else {
        return Ok(TableAccess::Unresolved {
            reason: ErrorCode::TableNotResolved.message().to_string(),
        });
    };

    // 门店一旦有二维码桌台，裸桌号不再可信
    if state.config.allow_legacy_table_param
        && table::count_by_store(&state.pool, store.id).await? == 0
    {
        return Ok(TableAccess::Legacy {
            table_no: table_no.to_string(),
        });
    }
    Ok(TableAccess::Unresolved {
        reason: "Table numbers without a QR code are not accepted".to_string(),
    })
}

/// Tables of a store in numeric order, each with its entry URL
pub async fn list_tables(state: &ServerState, store_id: i64) -> AppResult<Vec<TableEntry>> {
    let store = require_store(&state.pool, store_id).await?;
    let mut tables = table::find_by_store(&state.pool, store_id).await?;
    tables.sort_by(|a, b| compare_table_no(&a.table_no, &b.table_no));
    Ok(tables
        .into_iter()
        .map(|t| to_entry(&state.config.public_base_url, &store.slug, t))
        .collect())
}

/// Give tables `"1"..="count"` fresh tokens in one transaction
///
/// Missing tables are created; tables outside the range keep their token.
pub async fn rotate_tokens(
    state: &ServerState,
    store_id: i64,
    count: u32,
) -> AppResult<Vec<TableEntry>> {
    if count == 0 || count > MAX_TABLES {
        return Err(AppError::validation(format!(
            "Table count must be between 1 and {MAX_TABLES}"
        ))
        .with_detail("count", count));
    }
    let store = require_store(&state.pool, store_id).await?;

    let mut tx = state
        .pool
        .begin()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;
    let mut rotated = Vec::with_capacity(count as usize);
    for n in 1..=count {
        let row = table::upsert_token(&mut *tx, store_id, &n.to_string(), &new_qr_token()).await?;
        rotated.push(row);
    }
    tx.commit()
        .await
        .map_err(|e| AppError::database(e.to_string()))?;

    tracing::info!(store_id, count, "Table tokens rotated");

    Ok(rotated
        .into_iter()
        .map(|t| to_entry(&state.config.public_base_url, &store.slug, t))
        .collect())
}

/// Rotate (or create) a single table
pub async fn rotate_table(
    state: &ServerState,
    store_id: i64,
    table_no: &str,
) -> AppResult<TableEntry> {
    let table_no = table_no.trim();
    if table_no.is_empty() || table_no.chars().count() > MAX_TABLE_NO_LEN {
        return Err(AppError::validation(format!(
            "Table number must be 1 to {MAX_TABLE_NO_LEN} characters"
        ))
        .with_detail("table_no", table_no));
    }
    let store = require_store(&state.pool, store_id).await?;

    let row = table::upsert_token(&state.pool, store_id, table_no, &new_qr_token()).await?;

    tracing::info!(store_id, table_no, "Table token rotated");
    Ok(to_entry(&state.config.public_base_url, &store.slug, row))
}

pub(crate) async fn require_store(pool: &SqlitePool, store_id: i64) -> AppResult<Store> {
    store::find_by_id(pool, store_id)
        .await?
        .ok_or_else(|| AppError::store_not_found(store_id.to_string()))
}

fn to_entry(base_url: &str, slug: &str, table: DiningTable) -> TableEntry {
    TableEntry {
        url: entry_url(base_url, slug, &table.qr_token),
        table_no: table.table_no,
        qr_token: table.qr_token,
    }
}
