//! Store Repository

use super::{RepoError, RepoResult};
use shared::models::{Store, StoreCreate, StoreUpdate};
use sqlx::SqlitePool;

const STORE_SELECT: &str = "SELECT id, name, slug, logo_url, created_at FROM stores";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE id = ?");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE slug = ? LIMIT 1");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn create(pool: &SqlitePool, id: i64, data: StoreCreate, now: i64) -> RepoResult<Store> {
    let store = sqlx::query_as::<_, Store>(
        "INSERT INTO stores (id, name, slug, logo_url, created_at) VALUES (?, ?, ?, ?, ?) \
         RETURNING id, name, slug, logo_url, created_at",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.slug)
    .bind(&data.logo_url)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| match RepoError::from(e) {
        RepoError::Duplicate(_) => RepoError::Duplicate(format!("Slug '{}' is taken", data.slug)),
        other => other,
    })?;
    Ok(store)
}

pub async fn update(pool: &SqlitePool, id: i64, data: StoreUpdate) -> RepoResult<Store> {
    let store = sqlx::query_as::<_, Store>(
        "UPDATE stores SET name = COALESCE(?1, name), logo_url = COALESCE(?2, logo_url) \
         WHERE id = ?3 RETURNING id, name, slug, logo_url, created_at",
    )
    .bind(data.name)
    .bind(data.logo_url)
    .bind(id)
    .fetch_optional(pool)
    .await?;
    store.ok_or_else(|| RepoError::NotFound(format!("Store {id} not found")))
}
