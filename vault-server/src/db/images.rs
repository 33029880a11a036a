//! Item image database operations
//!
//! The primary image's URL is mirrored into `catalog_items.image`, and both
//! are always written in the same transaction.

use shared::error::{AppError, ErrorCode};
use shared::models::{ItemImage, ItemImageCreate};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::error::ServiceResult;

const IMAGE_COLUMNS: &str = "id, item_id, url, is_primary, created_at";

fn image_not_found(id: i64) -> AppError {
    AppError::new(ErrorCode::ImageNotFound).with_detail("id", id)
}

async fn ensure_item(conn: &mut PgConnection, user_id: Uuid, item_id: i64) -> ServiceResult<()> {
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM catalog_items WHERE id = $1 AND user_id = $2 FOR UPDATE")
            .bind(item_id)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::item_not_found(item_id).into()),
    }
}

/// Point the item's primary image at `url` (or clear it)
async fn mirror_primary(
    conn: &mut PgConnection,
    item_id: i64,
    url: Option<&str>,
) -> ServiceResult<()> {
    sqlx::query("UPDATE catalog_items SET image = $1, updated_at = $2 WHERE id = $3")
        .bind(url)
        .bind(shared::util::now_millis())
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

async fn clear_primary(conn: &mut PgConnection, item_id: i64) -> ServiceResult<()> {
    sqlx::query("UPDATE item_images SET is_primary = FALSE WHERE item_id = $1 AND is_primary")
        .bind(item_id)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn list_images(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
) -> ServiceResult<Vec<ItemImage>> {
    let images = sqlx::query_as::<_, ItemImage>(&format!(
        "SELECT {IMAGE_COLUMNS} FROM item_images WHERE item_id = $1 AND user_id = $2 \
         ORDER BY is_primary DESC, created_at, id"
    ))
    .bind(item_id)
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(images)
}

/// Attach an image. The first image of an item becomes primary automatically.
pub async fn add_image(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
    data: &ItemImageCreate,
) -> ServiceResult<ItemImage> {
    let mut tx = pool.begin().await?;
    ensure_item(&mut tx, user_id, item_id).await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM item_images WHERE item_id = $1")
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await?;

    let image = ItemImage {
        id: shared::util::snowflake_id(),
        item_id,
        url: data.url.clone(),
        is_primary: data.is_primary || existing == 0,
        created_at: shared::util::now_millis(),
    };

    if image.is_primary {
        clear_primary(&mut tx, item_id).await?;
    }
    sqlx::query(
        "INSERT INTO item_images (id, item_id, user_id, url, is_primary, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(image.id)
    .bind(item_id)
    .bind(user_id)
    .bind(&image.url)
    .bind(image.is_primary)
    .bind(image.created_at)
    .execute(&mut *tx)
    .await?;
    if image.is_primary {
        mirror_primary(&mut tx, item_id, Some(&image.url)).await?;
    }

    tx.commit().await?;
    Ok(image)
}

pub async fn set_primary(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
    image_id: i64,
) -> ServiceResult<ItemImage> {
    let mut tx = pool.begin().await?;
    ensure_item(&mut tx, user_id, item_id).await?;
    clear_primary(&mut tx, item_id).await?;

    let image = sqlx::query_as::<_, ItemImage>(&format!(
        "UPDATE item_images SET is_primary = TRUE \
         WHERE id = $1 AND item_id = $2 AND user_id = $3 RETURNING {IMAGE_COLUMNS}"
    ))
    .bind(image_id)
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(image) = image else {
        tx.rollback().await?;
        return Err(image_not_found(image_id).into());
    };

    mirror_primary(&mut tx, item_id, Some(&image.url)).await?;
    tx.commit().await?;
    Ok(image)
}

/// Remove an image. Deleting the primary promotes the oldest remaining image.
/// Returns the promoted image, if any.
pub async fn delete_image(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
    image_id: i64,
) -> ServiceResult<Option<ItemImage>> {
    let mut tx = pool.begin().await?;
    ensure_item(&mut tx, user_id, item_id).await?;

    let deleted: Option<(bool,)> = sqlx::query_as(
        "DELETE FROM item_images WHERE id = $1 AND item_id = $2 AND user_id = $3 \
         RETURNING is_primary",
    )
    .bind(image_id)
    .bind(item_id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some((was_primary,)) = deleted else {
        tx.rollback().await?;
        return Err(image_not_found(image_id).into());
    };

    let mut promoted = None;
    if was_primary {
        promoted = sqlx::query_as::<_, ItemImage>(&format!(
            "UPDATE item_images SET is_primary = TRUE WHERE id = ( \
               SELECT id FROM item_images WHERE item_id = $1 ORDER BY created_at, id LIMIT 1 \
             ) RETURNING {IMAGE_COLUMNS}"
        ))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?;
        mirror_primary(&mut tx, item_id, promoted.as_ref().map(|i| i.url.as_str())).await?;
    }

    tx.commit().await?;
    Ok(promoted)
}
