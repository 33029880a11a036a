//! Filter/sort engine and bulk actions
//!
//! Pure functions over in-memory snapshots. The server runs the same view
//! logic for `GET /api/items`; the client runs it over its local cache.

pub mod bulk;
pub mod filter;
pub mod query;
pub mod sort;

pub use bulk::*;
pub use filter::*;
pub use query::*;
pub use sort::*;

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::{CatalogItem, Collection, DEFAULT_COLLECTION_COLOR, ListingStatus};
    use uuid::Uuid;

    pub fn item(id: i64, name: &str) -> CatalogItem {
        CatalogItem {
            id,
            user_id: Uuid::nil(),
            name: name.to_string(),
            licensing: None,
            year: None,
            condition: None,
            size: None,
            tags: Vec::new(),
            image: None,
            description: None,
            date_added: id,
            estimated_value: None,
            listing_status: ListingStatus::Private,
            price: None,
            collection_id: None,
            measurements: None,
            acquisition: None,
        }
    }

    pub fn collection(id: i64, tags: &[&str]) -> Collection {
        Collection {
            id,
            user_id: Uuid::nil(),
            name: format!("c{id}"),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            color: DEFAULT_COLLECTION_COLOR.to_string(),
            icon: None,
            created_at: 0,
        }
    }
}
