//! Item image API

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{delete, get, put},
};
use shared::error::ApiResponse;
use shared::models::{ItemImage, ItemImageCreate};
use shared::realtime::{ChangeEvent, ChangeTable};
use validator::Validate;

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db::{images, items};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/items/{id}/images", get(list_images).post(add_image))
        .route(
            "/api/items/{id}/images/{image_id}/primary",
            put(set_primary),
        )
        .route("/api/items/{id}/images/{image_id}", delete(delete_image))
}

/// The item row mirrors its primary image, so publish it alongside
async fn publish_item(state: &AppState, identity: &UserIdentity, item_id: i64) {
    match items::get_item(&state.pool, identity.user_id, item_id).await {
        Ok(item) => state
            .changes
            .publish(identity.user_id, ChangeEvent::item_updated(&item)),
        Err(e) => {
            let e: shared::error::AppError = e.into();
            tracing::warn!(item_id, "Could not reload item after image change: {e}");
        }
    }
}

pub async fn list_images(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(item_id): Path<i64>,
) -> ApiResult<Vec<ItemImage>> {
    let images = images::list_images(&state.pool, identity.user_id, item_id).await?;
    Ok(ApiResponse::success(images))
}

pub async fn add_image(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(item_id): Path<i64>,
    Json(data): Json<ItemImageCreate>,
) -> ApiResult<ItemImage> {
    data.validate()?;
    let image = images::add_image(&state.pool, identity.user_id, item_id, &data).await?;

    state
        .changes
        .publish(identity.user_id, ChangeEvent::image_inserted(&image));
    if image.is_primary {
        publish_item(&state, &identity, item_id).await;
    }
    Ok(ApiResponse::success(image))
}

pub async fn set_primary(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((item_id, image_id)): Path<(i64, i64)>,
) -> ApiResult<ItemImage> {
    let image = images::set_primary(&state.pool, identity.user_id, item_id, image_id).await?;

    state
        .changes
        .publish(identity.user_id, ChangeEvent::image_updated(&image));
    publish_item(&state, &identity, item_id).await;
    Ok(ApiResponse::success(image))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path((item_id, image_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    let promoted = images::delete_image(&state.pool, identity.user_id, item_id, image_id).await?;

    state.changes.publish(
        identity.user_id,
        ChangeEvent::deleted(ChangeTable::ItemImages, image_id),
    );
    if let Some(image) = &promoted {
        state
            .changes
            .publish(identity.user_id, ChangeEvent::image_updated(image));
    }
    publish_item(&state, &identity, item_id).await;
    Ok(ApiResponse::ok())
}
