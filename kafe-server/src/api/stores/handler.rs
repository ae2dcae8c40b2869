//! Store API Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use shared::error::{ApiResponse, ErrorCode};
use shared::live::ChangeEvent;
use shared::models::{Store, StoreCreate, StoreUpdate, is_valid_slug};
use shared::util::{now_millis, snowflake_id};

use crate::core::ServerState;
use crate::db::repository::{RepoError, store};
use crate::tables::require_store;
use crate::utils::{AppError, AppResult, ok};

/// POST /api/admin/stores - 创建门店
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<StoreCreate>,
) -> AppResult<Json<ApiResponse<Store>>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::validation("Store name is required").with_detail("field", "name"));
    }
    if !is_valid_slug(&payload.slug) {
        return Err(AppError::validation(
            "Slug may contain lowercase letters, digits and single hyphens",
        )
        .with_detail("field", "slug"));
    }

    let slug = payload.slug.clone();
    let store = store::create(&state.pool, snowflake_id(), payload, now_millis())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => AppError::new(ErrorCode::StoreSlugExists).with_detail("slug", slug),
            other => other.into(),
        })?;

    tracing::info!(store_id = store.id, slug = %store.slug, "Store created");
    Ok(ok(store))
}

/// GET /api/admin/stores/{store_id} - 获取门店
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
) -> AppResult<Json<ApiResponse<Store>>> {
    let store = require_store(&state.pool, store_id).await?;
    Ok(ok(store))
}

/// PUT /api/admin/stores/{store_id} - 更新门店名称/Logo
pub async fn update(
    State(state): State<ServerState>,
    Path(store_id): Path<i64>,
    Json(payload): Json<StoreUpdate>,
) -> AppResult<Json<ApiResponse<Store>>> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::validation("Store name is required").with_detail("field", "name"));
    }
    let store = store::update(&state.pool, store_id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => AppError::store_not_found(store_id.to_string()),
            other => other.into(),
        })?;

    // 广播门店变更 (顾客端标题/Logo 实时更新)
    state.publish(ChangeEvent::StoreUpdated {
        store: store.clone(),
    });

    Ok(ok(store))
}
