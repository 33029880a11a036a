//! Profile database operations

use shared::error::{AppError, ErrorCode};
use shared::models::{Profile, ProfileUpdate, SocialHandles, Visibility};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};

const PROFILE_SELECT: &str = "SELECT p.id, p.username, u.email, p.bio, p.location, p.website, \
     p.socials, p.visibility, p.featured_item_ids, p.featured_collection_ids, p.display_order, \
     p.created_at FROM profiles p JOIN users u ON u.id = p.id";

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    email: String,
    bio: Option<String>,
    location: Option<String>,
    website: Option<String>,
    socials: Json<SocialHandles>,
    visibility: Json<Visibility>,
    featured_item_ids: Vec<i64>,
    featured_collection_ids: Vec<i64>,
    display_order: Vec<String>,
    created_at: i64,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            username: row.username,
            email: row.email,
            bio: row.bio,
            location: row.location,
            website: row.website,
            socials: row.socials.0,
            visibility: row.visibility.0,
            featured_item_ids: row.featured_item_ids,
            featured_collection_ids: row.featured_collection_ids,
            display_order: row.display_order,
            created_at: row.created_at,
        }
    }
}

/// Whether the user has finished username setup
pub async fn exists(pool: &PgPool, user_id: Uuid) -> Result<bool, sqlx::Error> {
    let (found,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM profiles WHERE id = $1)")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> ServiceResult<Option<Profile>> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Profile::from))
}

pub async fn get_by_user(pool: &PgPool, user_id: Uuid) -> ServiceResult<Profile> {
    find_by_user(pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound).into())
}

pub async fn get_by_username(pool: &PgPool, username: &str) -> ServiceResult<Profile> {
    let row = sqlx::query_as::<_, ProfileRow>(&format!("{PROFILE_SELECT} WHERE p.username = $1"))
        .bind(username.trim().to_lowercase())
        .fetch_optional(pool)
        .await?;
    row.map(Profile::from)
        .ok_or_else(|| AppError::new(ErrorCode::ProfileNotFound).into())
}

/// Map a unique violation to the right conflict error
fn conflict(err: sqlx::Error) -> ServiceError {
    let constraint = err
        .as_database_error()
        .filter(|_| super::is_unique_violation(&err))
        .and_then(|e| e.constraint().map(str::to_string));
    match constraint.as_deref() {
        Some("profiles_pkey") => AppError::already_exists("Profile").into(),
        Some(_) => AppError::new(ErrorCode::UsernameTaken).into(),
        None => err.into(),
    }
}

/// Create the profile row; `username` must already be normalized
pub async fn create_profile(pool: &PgPool, user_id: Uuid, username: &str) -> ServiceResult<Profile> {
    sqlx::query(
        "INSERT INTO profiles (id, username, socials, visibility, created_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(user_id)
    .bind(username)
    .bind(Json(SocialHandles::default()))
    .bind(Json(Visibility::default()))
    .bind(shared::util::now_millis())
    .execute(pool)
    .await
    .map_err(conflict)?;

    get_by_user(pool, user_id).await
}

pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    data: &ProfileUpdate,
) -> ServiceResult<Profile> {
    let mut profile = get_by_user(pool, user_id).await?;

    if let Some(bio) = &data.bio {
        profile.bio = Some(bio.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(location) = &data.location {
        profile.location = Some(location.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(website) = &data.website {
        profile.website = Some(website.clone()).filter(|s| !s.trim().is_empty());
    }
    if let Some(socials) = &data.socials {
        profile.socials = socials.clone();
    }
    if let Some(visibility) = data.visibility {
        profile.visibility = visibility;
    }
    if let Some(ids) = &data.featured_item_ids {
        profile.featured_item_ids = super::dedup_ids(ids);
    }
    if let Some(ids) = &data.featured_collection_ids {
        profile.featured_collection_ids = super::dedup_ids(ids);
    }
    if let Some(order) = &data.display_order {
        profile.display_order = order.clone();
    }

    sqlx::query(
        "UPDATE profiles SET bio = $1, location = $2, website = $3, socials = $4, \
         visibility = $5, featured_item_ids = $6, featured_collection_ids = $7, \
         display_order = $8 WHERE id = $9",
    )
    .bind(&profile.bio)
    .bind(&profile.location)
    .bind(&profile.website)
    .bind(Json(&profile.socials))
    .bind(Json(profile.visibility))
    .bind(&profile.featured_item_ids)
    .bind(&profile.featured_collection_ids)
    .bind(&profile.display_order)
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(profile)
}
