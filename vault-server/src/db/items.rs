//! Catalog item database operations

use rust_decimal::Decimal;
use shared::catalog::BulkActionRequest;
use shared::error::AppError;
use shared::models::{
    Acquisition, CatalogItem, CatalogItemCreate, CatalogItemUpdate, ListingStatus, Measurements,
    UnknownVariant, normalize_tags,
};
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use super::dedup_ids;
use crate::error::{ServiceError, ServiceResult};

const ITEM_COLUMNS: &str = "id, user_id, name, licensing, year, condition, size, tags, image, \
     description, date_added, estimated_value, listing_status, price, collection_id, \
     measurements, acquisition";

#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    id: i64,
    user_id: Uuid,
    name: String,
    licensing: Option<String>,
    year: Option<i32>,
    condition: Option<String>,
    size: Option<String>,
    tags: Vec<String>,
    image: Option<String>,
    description: Option<String>,
    date_added: i64,
    estimated_value: Option<Decimal>,
    listing_status: String,
    price: Option<Decimal>,
    collection_id: Option<i64>,
    measurements: Option<Json<Measurements>>,
    acquisition: Option<Json<Acquisition>>,
}

impl TryFrom<ItemRow> for CatalogItem {
    type Error = UnknownVariant;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        Ok(CatalogItem {
            id: row.id,
            user_id: row.user_id,
            name: row.name,
            licensing: row.licensing,
            year: row.year,
            condition: row.condition.as_deref().map(str::parse).transpose()?,
            size: row.size.as_deref().map(str::parse).transpose()?,
            tags: row.tags,
            image: row.image,
            description: row.description,
            date_added: row.date_added,
            estimated_value: row.estimated_value,
            listing_status: row.listing_status.parse()?,
            price: row.price,
            collection_id: row.collection_id,
            measurements: row.measurements.map(|j| j.0),
            acquisition: row.acquisition.map(|j| j.0),
        })
    }
}

fn into_items(rows: Vec<ItemRow>) -> ServiceResult<Vec<CatalogItem>> {
    rows.into_iter()
        .map(|r| CatalogItem::try_from(r).map_err(|e| ServiceError::Db(e.into())))
        .collect()
}

fn into_item(row: ItemRow) -> ServiceResult<CatalogItem> {
    CatalogItem::try_from(row).map_err(|e| ServiceError::Db(e.into()))
}

/// Price is only kept by statuses that carry one
fn settle_price(item: &mut CatalogItem) {
    if !item.listing_status.keeps_price() {
        item.price = None;
    }
}

/// Referenced collection must belong to the caller
async fn ensure_collection(
    conn: &mut PgConnection,
    user_id: Uuid,
    collection_id: Option<i64>,
) -> ServiceResult<()> {
    let Some(id) = collection_id else {
        return Ok(());
    };
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM collections WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .fetch_optional(conn)
            .await?;
    match found {
        Some(_) => Ok(()),
        None => Err(AppError::collection_not_found(id).into()),
    }
}

pub async fn list_items(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<CatalogItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM catalog_items WHERE user_id = $1 ORDER BY date_added DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    into_items(rows)
}

pub async fn get_item(pool: &PgPool, user_id: Uuid, id: i64) -> ServiceResult<CatalogItem> {
    let row: Option<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM catalog_items WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    into_item(row.ok_or_else(|| AppError::item_not_found(id))?)
}

/// Items a visitor may see: the requested ids minus anything Private
pub async fn list_public_items(
    pool: &PgPool,
    user_id: Uuid,
    ids: &[i64],
) -> ServiceResult<Vec<CatalogItem>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM catalog_items \
         WHERE user_id = $1 AND id = ANY($2) AND listing_status <> $3"
    ))
    .bind(user_id)
    .bind(ids)
    .bind(ListingStatus::Private.as_str())
    .fetch_all(pool)
    .await?;

    let mut items = into_items(rows)?;
    items.sort_by_key(|item| ids.iter().position(|id| *id == item.id));
    Ok(items)
}

/// Total estimated value of a user's catalog
pub async fn collection_value(pool: &PgPool, user_id: Uuid) -> ServiceResult<Decimal> {
    let (total,): (Option<Decimal>,) =
        sqlx::query_as("SELECT SUM(estimated_value) FROM catalog_items WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
    Ok(total.unwrap_or_default())
}

pub async fn distinct_tags(pool: &PgPool, user_id: Uuid) -> ServiceResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT t FROM catalog_items, unnest(tags) AS t WHERE user_id = $1 ORDER BY t",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(t,)| t).collect())
}

async fn write_item(conn: &mut PgConnection, item: &CatalogItem, insert: bool) -> ServiceResult<()> {
    let now = shared::util::now_millis();
    let sql = if insert {
        "INSERT INTO catalog_items (id, user_id, name, licensing, year, condition, size, tags, \
         image, description, date_added, estimated_value, listing_status, price, collection_id, \
         measurements, acquisition, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)"
    } else {
        "UPDATE catalog_items SET name = $3, licensing = $4, year = $5, condition = $6, size = $7, \
         tags = $8, image = $9, description = $10, date_added = $11, estimated_value = $12, \
         listing_status = $13, price = $14, collection_id = $15, measurements = $16, \
         acquisition = $17, updated_at = $18 \
         WHERE id = $1 AND user_id = $2"
    };
    sqlx::query(sql)
        .bind(item.id)
        .bind(item.user_id)
        .bind(&item.name)
        .bind(&item.licensing)
        .bind(item.year)
        .bind(item.condition.map(|c| c.as_str()))
        .bind(item.size.map(|s| s.as_str()))
        .bind(&item.tags)
        .bind(&item.image)
        .bind(&item.description)
        .bind(item.date_added)
        .bind(item.estimated_value)
        .bind(item.listing_status.as_str())
        .bind(item.price)
        .bind(item.collection_id)
        .bind(item.measurements.as_ref().map(Json))
        .bind(item.acquisition.as_ref().map(Json))
        .bind(now)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn create_item(
    pool: &PgPool,
    user_id: Uuid,
    data: &CatalogItemCreate,
) -> ServiceResult<CatalogItem> {
    let mut item = CatalogItem {
        id: shared::util::snowflake_id(),
        user_id,
        name: data.name.trim().to_string(),
        licensing: data.licensing.clone(),
        year: data.year,
        condition: data.condition,
        size: data.size,
        tags: normalize_tags(data.tags.as_deref().unwrap_or_default()),
        image: data.image.clone(),
        description: data.description.clone(),
        date_added: shared::util::now_millis(),
        estimated_value: data.estimated_value,
        listing_status: data.listing_status.unwrap_or_default(),
        price: data.price,
        collection_id: data.collection_id,
        measurements: data.measurements.clone(),
        acquisition: data.acquisition.clone(),
    };
    settle_price(&mut item);
    item.check_listing()?;

    let mut tx = pool.begin().await?;
    ensure_collection(&mut tx, user_id, item.collection_id).await?;
    write_item(&mut tx, &item, true).await?;
    tx.commit().await?;
    Ok(item)
}

pub async fn update_item(
    pool: &PgPool,
    user_id: Uuid,
    id: i64,
    data: &CatalogItemUpdate,
) -> ServiceResult<CatalogItem> {
    let mut tx = pool.begin().await?;
    let row: Option<ItemRow> = sqlx::query_as(&format!(
        "SELECT {ITEM_COLUMNS} FROM catalog_items WHERE id = $1 AND user_id = $2 FOR UPDATE"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(&mut *tx)
    .await?;
    let mut item = into_item(row.ok_or_else(|| AppError::item_not_found(id))?)?;

    item.apply_update(data);
    item.name = item.name.trim().to_string();
    settle_price(&mut item);
    item.check_listing()?;

    if data.collection_id.is_some() {
        ensure_collection(&mut tx, user_id, item.collection_id).await?;
    }
    write_item(&mut tx, &item, false).await?;
    tx.commit().await?;
    Ok(item)
}

pub async fn delete_item(pool: &PgPool, user_id: Uuid, id: i64) -> ServiceResult<()> {
    let rows = sqlx::query("DELETE FROM catalog_items WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(AppError::item_not_found(id).into());
    }
    Ok(())
}

fn missing_ids(requested: &[i64], found: &[i64]) -> Vec<i64> {
    requested
        .iter()
        .copied()
        .filter(|id| !found.contains(id))
        .collect()
}

fn not_owned(missing: Vec<i64>) -> ServiceError {
    AppError::with_message(
        shared::error::ErrorCode::ItemNotFound,
        format!("{} item(s) not found", missing.len()),
    )
    .with_detail("missing_ids", missing)
    .into()
}

/// Delete every requested item or none of them
pub async fn bulk_delete(pool: &PgPool, user_id: Uuid, ids: &[i64]) -> ServiceResult<Vec<i64>> {
    let ids = dedup_ids(ids);
    let mut tx = pool.begin().await?;
    let deleted: Vec<(i64,)> =
        sqlx::query_as("DELETE FROM catalog_items WHERE user_id = $1 AND id = ANY($2) RETURNING id")
            .bind(user_id)
            .bind(&ids)
            .fetch_all(&mut *tx)
            .await?;
    let deleted: Vec<i64> = deleted.into_iter().map(|(id,)| id).collect();

    let missing = missing_ids(&ids, &deleted);
    if !missing.is_empty() {
        tx.rollback().await?;
        return Err(not_owned(missing));
    }
    tx.commit().await?;
    Ok(ids)
}

/// Set status (and per-item price) on every requested item or none of them.
/// The request must already have passed `BulkActionRequest::validate`.
pub async fn bulk_set_status(
    pool: &PgPool,
    user_id: Uuid,
    request: &BulkActionRequest,
    status: ListingStatus,
) -> ServiceResult<Vec<CatalogItem>> {
    let ids = dedup_ids(&request.ids);
    let now = shared::util::now_millis();
    let mut tx = pool.begin().await?;
    let mut updated = Vec::with_capacity(ids.len());
    let mut missing = Vec::new();

    for id in &ids {
        let row: Option<ItemRow> = sqlx::query_as(&format!(
            "UPDATE catalog_items SET listing_status = $1, price = $2, updated_at = $3 \
             WHERE id = $4 AND user_id = $5 RETURNING {ITEM_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(request.price_for(*id))
        .bind(now)
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;
        match row {
            Some(row) => updated.push(into_item(row)?),
            None => missing.push(*id),
        }
    }

    if !missing.is_empty() {
        tx.rollback().await?;
        return Err(not_owned(missing));
    }
    tx.commit().await?;
    Ok(updated)
}

/// Detach every item from a collection about to be deleted
pub(super) async fn clear_collection(
    conn: &mut PgConnection,
    user_id: Uuid,
    collection_id: i64,
) -> ServiceResult<Vec<CatalogItem>> {
    let rows: Vec<ItemRow> = sqlx::query_as(&format!(
        "UPDATE catalog_items SET collection_id = NULL, updated_at = $1 \
         WHERE user_id = $2 AND collection_id = $3 RETURNING {ITEM_COLUMNS}"
    ))
    .bind(shared::util::now_millis())
    .bind(user_id)
    .bind(collection_id)
    .fetch_all(conn)
    .await?;
    into_items(rows)
}
