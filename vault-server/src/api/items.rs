//! Catalog item API

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use shared::catalog::{ViewParams, apply_view};
use shared::error::ApiResponse;
use shared::models::{CatalogItem, CatalogItemCreate, CatalogItemUpdate};
use shared::realtime::{ChangeEvent, ChangeTable};
use validator::Validate;

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db::{collections, items};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/items", get(list_items).post(create_item))
        .route(
            "/api/items/{id}",
            get(get_item).put(update_item).delete(delete_item),
        )
        .route("/api/tags", get(list_tags))
}

/// GET /api/items?search=&licensing=&year=&condition=&size=&collection=&sort=&dir=
pub async fn list_items(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Query(params): Query<ViewParams>,
) -> ApiResult<Vec<CatalogItem>> {
    let query = params.parse()?;
    let all = items::list_items(&state.pool, identity.user_id).await?;
    let collections = collections::list_collections(&state.pool, identity.user_id).await?;

    let visible = apply_view(&all, &query, &collections)
        .into_iter()
        .cloned()
        .collect();
    Ok(ApiResponse::success(visible))
}

pub async fn get_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<CatalogItem> {
    let item = items::get_item(&state.pool, identity.user_id, id).await?;
    Ok(ApiResponse::success(item))
}

pub async fn create_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(data): Json<CatalogItemCreate>,
) -> ApiResult<CatalogItem> {
    data.validate()?;
    let item = items::create_item(&state.pool, identity.user_id, &data).await?;

    tracing::info!(user_id = %identity.user_id, item_id = item.id, "Item created");
    state
        .changes
        .publish(identity.user_id, ChangeEvent::item_inserted(&item));
    Ok(ApiResponse::success(item))
}

pub async fn update_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<CatalogItemUpdate>,
) -> ApiResult<CatalogItem> {
    data.validate()?;
    let item = items::update_item(&state.pool, identity.user_id, id, &data).await?;

    state
        .changes
        .publish(identity.user_id, ChangeEvent::item_updated(&item));
    Ok(ApiResponse::success(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    items::delete_item(&state.pool, identity.user_id, id).await?;

    tracing::info!(user_id = %identity.user_id, item_id = id, "Item deleted");
    state
        .changes
        .publish(identity.user_id, ChangeEvent::deleted(ChangeTable::Items, id));
    Ok(ApiResponse::ok())
}

/// GET /api/tags: every tag in use, for the tag picker
pub async fn list_tags(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<String>> {
    let tags = items::distinct_tags(&state.pool, identity.user_id).await?;
    Ok(ApiResponse::success(tags))
}
