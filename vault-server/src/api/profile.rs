//! Profile API

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Profile, ProfileUpdate, PublicProfilePage, UsernameSetup, normalize_username};
use validator::Validate;

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db::{collections, items, profiles};
use crate::state::AppState;

/// Routes that need a session
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/profile", get(get_profile).put(update_profile))
        .route("/api/profile/username", post(setup_username))
}

/// Routes open to visitors
pub fn public_router() -> Router<AppState> {
    Router::new().route("/api/users/{username}", get(public_profile))
}

/// POST /api/profile/username: finish sign-up by claiming a username
pub async fn setup_username(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(data): Json<UsernameSetup>,
) -> ApiResult<Profile> {
    let username = normalize_username(&data.username).ok_or_else(|| {
        AppError::new(ErrorCode::UsernameInvalid).with_detail("username", data.username.clone())
    })?;
    let profile = profiles::create_profile(&state.pool, identity.user_id, &username).await?;

    tracing::info!(user_id = %identity.user_id, username = %profile.username, "Profile created");
    Ok(ApiResponse::success(profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Profile> {
    let profile = profiles::get_by_user(&state.pool, identity.user_id).await?;
    Ok(ApiResponse::success(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(data): Json<ProfileUpdate>,
) -> ApiResult<Profile> {
    data.validate()?;
    let profile = profiles::update_profile(&state.pool, identity.user_id, &data).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/users/{username}
pub async fn public_profile(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<PublicProfilePage> {
    let profile = profiles::get_by_username(&state.pool, &username).await?;

    let featured_items =
        items::list_public_items(&state.pool, profile.id, &profile.featured_item_ids).await?;
    let featured_collections =
        collections::list_by_ids(&state.pool, profile.id, &profile.featured_collection_ids)
            .await?;
    let collection_value = if profile.visibility.collection_value {
        Some(items::collection_value(&state.pool, profile.id).await?)
    } else {
        None
    };

    Ok(ApiResponse::success(PublicProfilePage {
        profile: profile.to_public(),
        featured_items,
        featured_collections,
        collection_value,
    }))
}
