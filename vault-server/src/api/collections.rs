//! Collection API
//!
//! A collection is a named tag set; its items are computed, never stored.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::catalog::in_collection;
use shared::error::ApiResponse;
use shared::models::{CatalogItem, Collection, CollectionCreate, CollectionUpdate};
use shared::realtime::{ChangeEvent, ChangeTable};
use validator::Validate;

use super::ApiResult;
use crate::auth::UserIdentity;
use crate::db::{collections, items};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/collections",
            get(list_collections).post(create_collection),
        )
        .route(
            "/api/collections/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route("/api/collections/{id}/items", get(collection_items))
}

pub async fn list_collections(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
) -> ApiResult<Vec<Collection>> {
    let collections = collections::list_collections(&state.pool, identity.user_id).await?;
    Ok(ApiResponse::success(collections))
}

pub async fn get_collection(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Collection> {
    let collection = collections::get_collection(&state.pool, identity.user_id, id).await?;
    Ok(ApiResponse::success(collection))
}

pub async fn create_collection(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Json(data): Json<CollectionCreate>,
) -> ApiResult<Collection> {
    data.validate()?;
    let collection = collections::create_collection(&state.pool, identity.user_id, &data).await?;

    tracing::info!(user_id = %identity.user_id, collection_id = collection.id, "Collection created");
    state
        .changes
        .publish(identity.user_id, ChangeEvent::collection_inserted(&collection));
    Ok(ApiResponse::success(collection))
}

pub async fn update_collection(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
    Json(data): Json<CollectionUpdate>,
) -> ApiResult<Collection> {
    data.validate()?;
    let collection =
        collections::update_collection(&state.pool, identity.user_id, id, &data).await?;

    state
        .changes
        .publish(identity.user_id, ChangeEvent::collection_updated(&collection));
    Ok(ApiResponse::success(collection))
}

pub async fn delete_collection(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    let cleared = collections::delete_collection(&state.pool, identity.user_id, id).await?;

    tracing::info!(
        user_id = %identity.user_id,
        collection_id = id,
        cleared_items = cleared.len(),
        "Collection deleted"
    );
    state
        .changes
        .publish_all(identity.user_id, deletion_events(id, &cleared));
    Ok(ApiResponse::ok())
}

/// Updates for detached items, then the collection delete
fn deletion_events(id: i64, cleared: &[CatalogItem]) -> Vec<ChangeEvent> {
    cleared
        .iter()
        .map(ChangeEvent::item_updated)
        .chain(std::iter::once(ChangeEvent::deleted(
            ChangeTable::Collections,
            id,
        )))
        .collect()
}

/// GET /api/collections/{id}/items: items sharing at least one tag
pub async fn collection_items(
    State(state): State<AppState>,
    Extension(identity): Extension<UserIdentity>,
    Path(id): Path<i64>,
) -> ApiResult<Vec<CatalogItem>> {
    let collection = collections::get_collection(&state.pool, identity.user_id, id).await?;
    let members = items::list_items(&state.pool, identity.user_id)
        .await?
        .into_iter()
        .filter(|item| in_collection(item, &collection.tags))
        .collect();
    Ok(ApiResponse::success(members))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::ListingStatus;
    use shared::realtime::ChangeKind;
    use uuid::Uuid;

    fn detached(id: i64) -> CatalogItem {
        CatalogItem {
            id,
            user_id: Uuid::nil(),
            name: format!("Tee {id}"),
            licensing: None,
            year: None,
            condition: None,
            size: None,
            tags: Vec::new(),
            image: None,
            description: None,
            date_added: 0,
            estimated_value: None,
            listing_status: ListingStatus::Private,
            price: None,
            collection_id: None,
            measurements: None,
            acquisition: None,
        }
    }

    #[test]
    fn deleting_collection_announces_detached_items_first() {
        let events = deletion_events(7, &[detached(1), detached(2)]);
        assert_eq!(events.len(), 3);

        let updated: Vec<i64> = events[..2]
            .iter()
            .map(|e| {
                assert_eq!(e.table, ChangeTable::Items);
                let item: CatalogItem = e.decode().unwrap();
                assert_eq!(item.collection_id, None);
                item.id
            })
            .collect();
        assert_eq!(updated, vec![1, 2]);
        assert_eq!(events[2], ChangeEvent::deleted(ChangeTable::Collections, 7));
    }

    #[test]
    fn empty_collection_only_announces_delete() {
        let events = deletion_events(7, &[]);
        assert!(matches!(
            events.as_slice(),
            [ChangeEvent { table: ChangeTable::Collections, kind: ChangeKind::Delete { id: 7 } }]
        ));
    }
}
