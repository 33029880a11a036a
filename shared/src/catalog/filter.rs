//! Search, category filter and collection predicates

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::AppError;
use crate::models::{CatalogItem, Collection, Condition, Size};

/// Filterable item attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterCategory {
    Licensing,
    Year,
    Condition,
    Size,
}

/// Accepted values per category; an empty list accepts everything
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryFilters {
    pub licensing: Vec<String>,
    pub year: Vec<i32>,
    pub condition: Vec<Condition>,
    pub size: Vec<Size>,
}

/// Which collection the view is scoped to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectionSelection {
    #[default]
    All,
    Id(i64),
}

fn accepts<T: PartialEq>(accepted: &[T], value: Option<&T>) -> bool {
    accepted.is_empty() || value.is_some_and(|v| accepted.contains(v))
}

fn toggle_value<T: PartialEq>(values: &mut Vec<T>, value: T) {
    if let Some(pos) = values.iter().position(|v| *v == value) {
        values.remove(pos);
    } else {
        values.push(value);
    }
}

impl CategoryFilters {
    /// No category restricts anything
    pub fn is_empty(&self) -> bool {
        self.licensing.is_empty()
            && self.year.is_empty()
            && self.condition.is_empty()
            && self.size.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Add or remove one accepted value, given as its display label
    pub fn toggle(&mut self, category: FilterCategory, value: &str) -> Result<(), AppError> {
        let invalid = || AppError::validation(format!("invalid {category:?} value: {value}"));
        match category {
            FilterCategory::Licensing => self.toggle_licensing(value),
            FilterCategory::Year => self.toggle_year(value.parse().map_err(|_| invalid())?),
            FilterCategory::Condition => {
                self.toggle_condition(value.parse().map_err(|_| invalid())?)
            }
            FilterCategory::Size => self.toggle_size(value.parse().map_err(|_| invalid())?),
        }
        Ok(())
    }

    pub fn toggle_licensing(&mut self, value: impl Into<String>) {
        toggle_value(&mut self.licensing, value.into());
    }

    pub fn toggle_year(&mut self, value: i32) {
        toggle_value(&mut self.year, value);
    }

    pub fn toggle_condition(&mut self, value: Condition) {
        toggle_value(&mut self.condition, value);
    }

    pub fn toggle_size(&mut self, value: Size) {
        toggle_value(&mut self.size, value);
    }

    /// An item passes when every category accepts its value
    pub fn passes(&self, item: &CatalogItem) -> bool {
        accepts(&self.licensing, item.licensing.as_ref())
            && accepts(&self.year, item.year.as_ref())
            && accepts(&self.condition, item.condition.as_ref())
            && accepts(&self.size, item.size.as_ref())
    }
}

pub fn passes_filters(item: &CatalogItem, filters: &CategoryFilters) -> bool {
    filters.passes(item)
}

/// Case-insensitive substring match against name, licensing, description or any tag.
/// A blank search matches everything.
pub fn matches_search(item: &CatalogItem, search: &str) -> bool {
    let needle = search.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    let hit = |s: &str| s.to_lowercase().contains(&needle);
    hit(&item.name)
        || item.licensing.as_deref().is_some_and(hit)
        || item.description.as_deref().is_some_and(hit)
        || item.tags.iter().any(|t| hit(t))
}

/// Tag-intersection membership test
pub fn in_collection(item: &CatalogItem, collection_tags: &[String]) -> bool {
    item.tags.iter().any(|t| collection_tags.contains(t))
}

/// Selection scoping; `All` admits every item, an unknown id admits none
pub fn in_selection(
    item: &CatalogItem,
    selection: CollectionSelection,
    collections: &[Collection],
) -> bool {
    match selection {
        CollectionSelection::All => true,
        CollectionSelection::Id(id) => collections
            .iter()
            .find(|c| c.id == id)
            .is_some_and(|c| c.contains_tags(&item.tags)),
    }
}

/// Distinct values present in `items` for a category, for filter menus.
/// Years ascend numerically; enum values follow their declaration order.
pub fn distinct_values(items: &[CatalogItem], category: FilterCategory) -> Vec<String> {
    match category {
        FilterCategory::Licensing => items
            .iter()
            .filter_map(|i| i.licensing.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect(),
        FilterCategory::Year => items
            .iter()
            .filter_map(|i| i.year)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|y| y.to_string())
            .collect(),
        FilterCategory::Condition => items
            .iter()
            .filter_map(|i| i.condition)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|c| c.to_string())
            .collect(),
        FilterCategory::Size => items
            .iter()
            .filter_map(|i| i.size)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|s| s.to_string())
            .collect(),
    }
}

/// Every distinct tag across `items`, sorted
pub fn distinct_tags(items: &[CatalogItem]) -> Vec<String> {
    items
        .iter()
        .flat_map(|i| i.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
