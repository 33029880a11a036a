//! Collection Model
//!
//! A collection is a saved, tag-based view: an item belongs to it when the
//! item carries at least one of the collection's tags.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Default collection color
pub const DEFAULT_COLLECTION_COLOR: &str = "#3B82F6";

/// Collection entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Collection {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    /// Membership predicate: any overlap with an item's tags
    pub tags: Vec<String>,
    pub color: String,
    pub icon: Option<String>,
    pub created_at: i64,
}

impl Collection {
    /// Whether an item tagged with `item_tags` is a member of this collection
    pub fn contains_tags(&self, item_tags: &[String]) -> bool {
        item_tags.iter().any(|t| self.tags.contains(t))
    }
}

/// Create collection payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CollectionCreate {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(max = 32))]
    pub color: Option<String>,
    #[validate(length(max = 64))]
    pub icon: Option<String>,
}

/// Update collection payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CollectionUpdate {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 32))]
    pub color: Option<String>,
    #[validate(length(max = 64))]
    pub icon: Option<String>,
}

impl Collection {
    /// Apply an update payload in place (used for optimistic local edits)
    pub fn apply_update(&mut self, update: &CollectionUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(tags) = &update.tags {
            self.tags = super::normalize_tags(tags);
        }
        if let Some(color) = &update.color {
            self.color = color.clone();
        }
        if let Some(icon) = &update.icon {
            self.icon = Some(icon.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(tags: &[&str]) -> Collection {
        Collection {
            id: 1,
            user_id: Uuid::nil(),
            name: "Metal".into(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            color: DEFAULT_COLLECTION_COLOR.into(),
            icon: None,
            created_at: 0,
        }
    }

    #[test]
    fn membership_is_tag_intersection() {
        let c = collection(&["metal", "thrash"]);
        assert!(c.contains_tags(&["punk".into(), "thrash".into()]));
        assert!(!c.contains_tags(&["punk".into()]));
        assert!(!c.contains_tags(&[]));
    }

    #[test]
    fn membership_is_case_sensitive() {
        let c = collection(&["metal"]);
        assert!(!c.contains_tags(&["Metal".into()]));
    }

    #[test]
    fn empty_collection_matches_nothing() {
        let c = collection(&[]);
        assert!(!c.contains_tags(&["metal".into()]));
    }

    #[test]
    fn apply_update_normalizes_tags() {
        let mut c = collection(&["metal"]);
        c.apply_update(&CollectionUpdate {
            tags: Some(vec![" doom ".into(), "doom".into()]),
            ..Default::default()
        });
        assert_eq!(c.tags, vec!["doom"]);
        assert_eq!(c.name, "Metal");
    }
}
