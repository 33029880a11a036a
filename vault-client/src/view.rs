//! Collection view controller
//!
//! Holds the caller's items and collections as a local mirror of the server,
//! plus the view state (search, filters, collection scope, sort, selection).
//! Mutations are applied locally first, then sent; a failed call restores the
//! snapshot taken before the local change and returns the error.

use rust_decimal::Decimal;
use shared::catalog::{
    BulkActionRequest, BulkActionResult, CollectionSelection, FilterCategory, SortField,
    SortSpec, SortState, ViewQuery, apply_view, distinct_tags, distinct_values,
};
use shared::models::{
    CatalogItem, CatalogItemCreate, CatalogItemUpdate, Collection, CollectionCreate,
    CollectionUpdate, ListingStatus,
};
use shared::realtime::{ChangeEvent, ChangeKind, ChangeTable, RealtimeMessage};
use std::collections::BTreeSet;

use crate::http::CatalogApi;
use crate::ClientResult;

/// Supplies a sale price per item when a selection moves to "For Sale".
/// Returning `None` cancels the whole batch.
pub trait PriceSource {
    fn price_for(&mut self, item: &CatalogItem) -> Option<Decimal>;
}

impl<F> PriceSource for F
where
    F: FnMut(&CatalogItem) -> Option<Decimal>,
{
    fn price_for(&mut self, item: &CatalogItem) -> Option<Decimal> {
        self(item)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulkOutcome {
    Applied(BulkActionResult),
    /// A price prompt was dismissed; nothing was sent
    Cancelled,
}

/// What a realtime frame did to the mirror
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealtimeAction {
    Ignored,
    Merged,
    /// Events were missed; call [`CollectionView::refresh`]
    RefreshNeeded,
}

pub struct CollectionView<A: CatalogApi> {
    api: A,
    items: Vec<CatalogItem>,
    collections: Vec<Collection>,
    query: ViewQuery,
    selected: BTreeSet<i64>,
}

impl<A: CatalogApi> CollectionView<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            items: Vec::new(),
            collections: Vec::new(),
            query: ViewQuery::default(),
            selected: BTreeSet::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn query(&self) -> &ViewQuery {
        &self.query
    }

    pub fn item(&self, id: i64) -> Option<&CatalogItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_index(&self, id: i64) -> Option<usize> {
        self.items.iter().position(|i| i.id == id)
    }

    fn collection_index(&self, id: i64) -> Option<usize> {
        self.collections.iter().position(|c| c.id == id)
    }

    /// Reload items and collections from the server
    pub async fn refresh(&mut self) -> ClientResult<()> {
        let items = self.api.list_items().await?;
        let collections = self.api.list_collections().await?;
        self.items = items;
        self.collections = collections;
        self.prune();
        tracing::debug!(
            items = self.items.len(),
            collections = self.collections.len(),
            "Collection view refreshed"
        );
        Ok(())
    }

    /// Drop selection and scope entries that no longer exist
    fn prune(&mut self) {
        let items = &self.items;
        self.selected.retain(|id| items.iter().any(|i| i.id == *id));
        if let CollectionSelection::Id(id) = self.query.collection
            && self.collection_index(id).is_none()
        {
            self.query.collection = CollectionSelection::All;
        }
    }

    // ========== View state ==========

    /// Items that pass the current search, filters and collection scope, sorted
    pub fn visible(&self) -> Vec<&CatalogItem> {
        apply_view(&self.items, &self.query, &self.collections)
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    pub fn toggle_filter(&mut self, category: FilterCategory, value: &str) -> ClientResult<()> {
        self.query.filters.toggle(category, value)?;
        Ok(())
    }

    pub fn clear_filters(&mut self) {
        self.query.filters.clear();
    }

    pub fn select_collection(&mut self, selection: CollectionSelection) {
        self.query.collection = selection;
    }

    /// Column header click
    pub fn toggle_sort(&mut self, field: SortField) {
        let mut state = SortState(self.query.sort);
        state.toggle(field);
        self.query.sort = state.spec();
    }

    pub fn sort(&self) -> Option<SortSpec> {
        self.query.sort
    }

    /// Values offered in a filter menu
    pub fn facets(&self, category: FilterCategory) -> Vec<String> {
        distinct_values(&self.items, category)
    }

    pub fn tags(&self) -> Vec<String> {
        distinct_tags(&self.items)
    }

    // ========== Selection ==========

    pub fn toggle_selected(&mut self, id: i64) {
        if !self.selected.remove(&id) && self.item_index(id).is_some() {
            self.selected.insert(id);
        }
    }

    pub fn is_selected(&self, id: i64) -> bool {
        self.selected.contains(&id)
    }

    /// Select every visible item, or clear the selection if all are selected already
    pub fn toggle_select_all(&mut self) {
        let visible: Vec<i64> = self.visible().iter().map(|i| i.id).collect();
        if !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id)) {
            self.selected.clear();
        } else {
            self.selected.extend(visible);
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn selected(&self) -> Vec<i64> {
        self.selected.iter().copied().collect()
    }

    // ========== Item mutations ==========

    pub async fn create_item(&mut self, data: &CatalogItemCreate) -> ClientResult<CatalogItem> {
        let item = self.api.create_item(data).await?;
        self.upsert_item(item.clone(), true);
        Ok(item)
    }

    /// Optimistic edit; restored if the server rejects it
    pub async fn update_item(
        &mut self,
        id: i64,
        update: &CatalogItemUpdate,
    ) -> ClientResult<CatalogItem> {
        let snapshot = self.item_index(id).map(|idx| {
            let before = self.items[idx].clone();
            let item = &mut self.items[idx];
            item.apply_update(update);
            if !item.listing_status.keeps_price() {
                item.price = None;
            }
            before
        });

        match self.api.update_item(id, update).await {
            Ok(item) => {
                self.upsert_item(item.clone(), false);
                Ok(item)
            }
            Err(e) => {
                if let Some(before) = snapshot
                    && let Some(idx) = self.item_index(id)
                {
                    self.items[idx] = before;
                }
                tracing::warn!(id, "Item update failed, reverted: {e}");
                Err(e)
            }
        }
    }

    /// Optimistic delete; the item returns to its old position on failure
    pub async fn delete_item(&mut self, id: i64) -> ClientResult<()> {
        let removed = self
            .item_index(id)
            .map(|idx| (idx, self.items.remove(idx)));
        let was_selected = self.selected.remove(&id);

        if let Err(e) = self.api.delete_item(id).await {
            if let Some((idx, item)) = removed {
                let idx = idx.min(self.items.len());
                self.items.insert(idx, item);
            }
            if was_selected {
                self.selected.insert(id);
            }
            tracing::warn!(id, "Item delete failed, reverted: {e}");
            return Err(e);
        }
        Ok(())
    }

    fn upsert_item(&mut self, item: CatalogItem, front: bool) {
        match self.item_index(item.id) {
            Some(idx) => self.items[idx] = item,
            None if front => self.items.insert(0, item),
            None => self.items.push(item),
        }
    }

    // ========== Bulk actions ==========

    /// Move the selection to `status`.
    ///
    /// For "For Sale" every price is collected before anything changes; a
    /// dismissed prompt returns [`BulkOutcome::Cancelled`].
    pub async fn bulk_set_status<P: PriceSource + ?Sized>(
        &mut self,
        status: ListingStatus,
        prices: &mut P,
    ) -> ClientResult<BulkOutcome> {
        let ids = self.selected();
        let mut collected = std::collections::HashMap::new();
        if status.requires_price() {
            for id in &ids {
                let Some(item) = self.item(*id) else {
                    continue;
                };
                match prices.price_for(item) {
                    Some(price) => {
                        collected.insert(*id, price);
                    }
                    None => {
                        tracing::debug!(id, "Bulk status change cancelled at price prompt");
                        return Ok(BulkOutcome::Cancelled);
                    }
                }
            }
        }
        self.dispatch(BulkActionRequest::set_status(ids, status, collected))
            .await
    }

    pub async fn bulk_delete(&mut self) -> ClientResult<BulkOutcome> {
        self.dispatch(BulkActionRequest::delete(self.selected()))
            .await
    }

    async fn dispatch(&mut self, request: BulkActionRequest) -> ClientResult<BulkOutcome> {
        request.validate()?;

        let snapshot = self.items.clone();
        request.apply_to(&mut self.items);

        match self.api.bulk_action(&request).await {
            Ok(result) => {
                self.selected.clear();
                Ok(BulkOutcome::Applied(result))
            }
            Err(e) => {
                self.items = snapshot;
                tracing::warn!(count = request.ids.len(), "Bulk action failed, reverted: {e}");
                Err(e)
            }
        }
    }

    // ========== Collections ==========

    pub async fn create_collection(&mut self, data: &CollectionCreate) -> ClientResult<Collection> {
        let collection = self.api.create_collection(data).await?;
        self.upsert_collection(collection.clone());
        Ok(collection)
    }

    pub async fn update_collection(
        &mut self,
        id: i64,
        update: &CollectionUpdate,
    ) -> ClientResult<Collection> {
        let before = self.collection_index(id).map(|idx| {
            let before = self.collections[idx].clone();
            self.collections[idx].apply_update(update);
            before
        });

        match self.api.update_collection(id, update).await {
            Ok(collection) => {
                self.upsert_collection(collection.clone());
                Ok(collection)
            }
            Err(e) => {
                if let Some(before) = before
                    && let Some(idx) = self.collection_index(id)
                {
                    self.collections[idx] = before;
                }
                Err(e)
            }
        }
    }

    /// Optimistic delete; an active scope on the deleted collection falls back to all items
    pub async fn delete_collection(&mut self, id: i64) -> ClientResult<()> {
        let removed = self
            .collection_index(id)
            .map(|idx| (idx, self.collections.remove(idx)));
        let scope = self.query.collection;
        if scope == CollectionSelection::Id(id) {
            self.query.collection = CollectionSelection::All;
        }

        if let Err(e) = self.api.delete_collection(id).await {
            if let Some((idx, collection)) = removed {
                let idx = idx.min(self.collections.len());
                self.collections.insert(idx, collection);
            }
            self.query.collection = scope;
            return Err(e);
        }

        for item in self.items.iter_mut().filter(|i| i.collection_id == Some(id)) {
            item.collection_id = None;
        }
        Ok(())
    }

    fn upsert_collection(&mut self, collection: Collection) {
        match self.collection_index(collection.id) {
            Some(idx) => self.collections[idx] = collection,
            None => self.collections.push(collection),
        }
    }

    // ========== Realtime ==========

    /// Merge one server change into the mirror. The latest event wins.
    /// Returns whether anything changed.
    pub fn apply_change(&mut self, event: &ChangeEvent) -> bool {
        match (event.table, &event.kind) {
            (ChangeTable::Items, ChangeKind::Insert { .. }) => {
                match event.decode::<CatalogItem>() {
                    Some(item) => {
                        self.upsert_item(item, true);
                        true
                    }
                    None => false,
                }
            }
            (ChangeTable::Items, ChangeKind::Update { .. }) => {
                match event.decode::<CatalogItem>() {
                    Some(item) => match self.item_index(item.id) {
                        Some(idx) => {
                            self.items[idx] = item;
                            true
                        }
                        None => false,
                    },
                    None => false,
                }
            }
            (ChangeTable::Items, ChangeKind::Delete { id }) => {
                self.selected.remove(id);
                match self.item_index(*id) {
                    Some(idx) => {
                        self.items.remove(idx);
                        true
                    }
                    None => false,
                }
            }
            (ChangeTable::Collections, ChangeKind::Insert { .. } | ChangeKind::Update { .. }) => {
                match event.decode::<Collection>() {
                    Some(collection) => {
                        self.upsert_collection(collection);
                        true
                    }
                    None => false,
                }
            }
            (ChangeTable::Collections, ChangeKind::Delete { id }) => {
                match self.collection_index(*id) {
                    Some(idx) => {
                        self.collections.remove(idx);
                        self.prune();
                        true
                    }
                    None => false,
                }
            }
            // Primary image changes arrive as item updates too
            (ChangeTable::ItemImages, _) => false,
        }
    }

    pub fn on_message(&mut self, message: &RealtimeMessage) -> RealtimeAction {
        match message {
            RealtimeMessage::Ready => RealtimeAction::Ignored,
            RealtimeMessage::Change { event } => {
                if self.apply_change(event) {
                    RealtimeAction::Merged
                } else {
                    RealtimeAction::Ignored
                }
            }
            RealtimeMessage::Resync => RealtimeAction::RefreshNeeded,
        }
    }
}

