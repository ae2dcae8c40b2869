//! Product Repository

use super::{RepoError, RepoResult};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqlitePool;

const PRODUCT_COLUMNS: &str =
    "id, store_id, name, price, category, image_url, description, created_at";

/// Menu of a store, grouped by category
pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Product>> {
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE store_id = ? ORDER BY category, name"
    );
    let products = sqlx::query_as::<_, Product>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(products)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(product)
}

pub async fn create(
    pool: &SqlitePool,
    id: i64,
    store_id: i64,
    data: ProductCreate,
    now: i64,
) -> RepoResult<Product> {
    let sql = format!(
        "INSERT INTO products (id, store_id, name, price, category, image_url, description, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(store_id)
        .bind(data.name)
        .bind(data.price)
        .bind(data.category)
        .bind(data.image_url)
        .bind(data.description)
        .bind(now)
        .fetch_one(pool)
        .await?;
    Ok(product)
}

pub async fn update(
    pool: &SqlitePool,
    store_id: i64,
    id: i64,
    data: ProductUpdate,
) -> RepoResult<Product> {
    let sql = format!(
        "UPDATE products SET name = COALESCE(?1, name), price = COALESCE(?2, price), \
         category = COALESCE(?3, category), image_url = COALESCE(?4, image_url), \
         description = COALESCE(?5, description) \
         WHERE id = ?6 AND store_id = ?7 RETURNING {PRODUCT_COLUMNS}"
    );
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(data.name)
        .bind(data.price)
        .bind(data.category)
        .bind(data.image_url)
        .bind(data.description)
        .bind(id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    product.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}
