//! Product API Handlers
//!
//! Editing a product never touches existing orders: each order carries its
//! own item snapshot.

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate};
use shared::money::is_valid_price;
use shared::util::{now_millis, snowflake_id};

use crate::core::ServerState;
use crate::db::repository::{RepoError, product};
use crate::tables::require_store;
use crate::utils::{AppError, AppResult, ok};

/// GET /api/admin/stores/{store_id}/products - 获取菜单
pub async fn list(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Vec<Product>>>> {
    require_store(&state.pool, store_id).await?;
    let products = product::find_by_store(&state.pool, store_id).await?;
    Ok(ok(products))
}

/// POST /api/admin/stores/{store_id}/products - 创建商品
pub async fn create(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_fields(Some(&payload.name), Some(payload.price), Some(&payload.category))?;
    require_store(&state.pool, store_id).await?;

    let product = product::create(&state.pool, snowflake_id(), store_id, payload, now_millis()).await?;
    tracing::info!(store_id, product_id = product.id, "Product created");
    Ok(ok(product))
}

/// PUT /api/admin/stores/{store_id}/products/{id} - 更新商品
pub async fn update(
    State(state): State<ServerState>,
    Path((store_id, id)): Path<(i64, i64)>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<ApiResponse<Product>>> {
    validate_fields(
        payload.name.as_ref(),
        payload.price,
        payload.category.as_ref(),
    )?;

    let product = product::update(&state.pool, store_id, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", id)
            }
            other => other.into(),
        })?;
    Ok(ok(product))
}

fn validate_fields(
    name: Option<&String>,
    price: Option<f64>,
    category: Option<&String>,
) -> AppResult<()> {
    if name.is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::validation("Product name is required").with_detail("field", "name"));
    }
    if category.is_some_and(|c| c.trim().is_empty()) {
        return Err(
            AppError::validation("Product category is required").with_detail("field", "category")
        );
    }
    if let Some(price) = price
        && !is_valid_price(price)
    {
        return Err(AppError::new(ErrorCode::ProductInvalidPrice).with_detail("price", price));
    }
    Ok(())
}
