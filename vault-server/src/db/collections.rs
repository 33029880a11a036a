//! Collection database operations

use shared::error::{AppError, ErrorCode};
use shared::models::{
    CatalogItem, Collection, CollectionCreate, CollectionUpdate, DEFAULT_COLLECTION_COLOR,
    normalize_tags,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ServiceResult;

const COLLECTION_COLUMNS: &str = "id, user_id, name, tags, color, icon, created_at";

fn clean_name(name: &str) -> Result<String, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::new(ErrorCode::CollectionNameRequired));
    }
    Ok(name.to_string())
}

pub async fn list_collections(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<Collection>> {
    let collections = sqlx::query_as::<_, Collection>(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections WHERE user_id = $1 ORDER BY created_at, id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(collections)
}

pub async fn get_collection(pool: &PgPool, user_id: Uuid, id: i64) -> ServiceResult<Collection> {
    sqlx::query_as::<_, Collection>(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::collection_not_found(id).into())
}

/// Collections by id, for public profiles; keeps the requested order
pub async fn list_by_ids(
    pool: &PgPool,
    user_id: Uuid,
    ids: &[i64],
) -> ServiceResult<Vec<Collection>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut collections = sqlx::query_as::<_, Collection>(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections WHERE user_id = $1 AND id = ANY($2)"
    ))
    .bind(user_id)
    .bind(ids)
    .fetch_all(pool)
    .await?;
    collections.sort_by_key(|c| ids.iter().position(|id| *id == c.id));
    Ok(collections)
}

pub async fn create_collection(
    pool: &PgPool,
    user_id: Uuid,
    data: &CollectionCreate,
) -> ServiceResult<Collection> {
    let collection = Collection {
        id: shared::util::snowflake_id(),
        user_id,
        name: clean_name(&data.name)?,
        tags: normalize_tags(&data.tags),
        color: data
            .color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_COLLECTION_COLOR.to_string()),
        icon: data.icon.clone(),
        created_at: shared::util::now_millis(),
    };

    sqlx::query(
        "INSERT INTO collections (id, user_id, name, tags, color, icon, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(collection.id)
    .bind(collection.user_id)
    .bind(&collection.name)
    .bind(&collection.tags)
    .bind(&collection.color)
    .bind(&collection.icon)
    .bind(collection.created_at)
    .execute(pool)
    .await?;

    Ok(collection)
}

pub async fn update_collection(
    pool: &PgPool,
    user_id: Uuid,
    id: i64,
    data: &CollectionUpdate,
) -> ServiceResult<Collection> {
    let mut tx = pool.begin().await?;
    let mut collection = sqlx::query_as::<_, Collection>(&format!(
        "SELECT {COLLECTION_COLUMNS} FROM collections WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::collection_not_found(id))?;

    collection.apply_update(data);
    collection.name = clean_name(&collection.name)?;

    sqlx::query(
        "UPDATE collections SET name = $1, tags = $2, color = $3, icon = $4 \
         WHERE id = $5 AND user_id = $6",
    )
    .bind(&collection.name)
    .bind(&collection.tags)
    .bind(&collection.color)
    .bind(&collection.icon)
    .bind(id)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    Ok(collection)
}

/// Delete a collection. Items pointing at it keep existing with no
/// collection and are returned so callers can announce the change.
pub async fn delete_collection(
    pool: &PgPool,
    user_id: Uuid,
    id: i64,
) -> ServiceResult<Vec<CatalogItem>> {
    let mut tx = pool.begin().await?;
    let cleared = super::items::clear_collection(&mut tx, user_id, id).await?;
    let rows = sqlx::query("DELETE FROM collections WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if rows.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(AppError::collection_not_found(id).into());
    }
    tx.commit().await?;
    Ok(cleared)
}
