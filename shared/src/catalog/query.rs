//! View query: search + filters + collection + sort
//!
//! `ViewParams` is the query-string form accepted by `GET /api/items` and
//! built by the client; `ViewQuery` is the parsed, typed form the engine runs.

use serde::{Deserialize, Serialize};

use super::filter::{CategoryFilters, CollectionSelection, in_selection, matches_search};
use super::sort::{SortDirection, SortField, SortSpec, sort_items};
use crate::error::AppError;
use crate::models::{CatalogItem, Collection};

/// Typed view state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewQuery {
    pub search: String,
    pub filters: CategoryFilters,
    pub collection: CollectionSelection,
    pub sort: Option<SortSpec>,
}

/// Query-string form; list values are comma separated, with `,` and `%`
/// inside a value escaped as `%2C` and `%25`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licensing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Collection id or `all`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collection: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

/// Escape the list separator inside one value
fn escape_value(value: &str) -> String {
    value.replace('%', "%25").replace(',', "%2C")
}

fn unescape_value(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

fn split_list(raw: &Option<String>) -> impl Iterator<Item = String> {
    raw.as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(unescape_value)
}

fn parse_list<T>(raw: &Option<String>, field: &str) -> Result<Vec<T>, AppError>
where
    T: std::str::FromStr,
{
    split_list(raw)
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| AppError::validation(format!("invalid {field} filter: {s}")))
        })
        .collect()
}

fn join<T: ToString>(values: &[T]) -> Option<String> {
    (!values.is_empty()).then(|| {
        values
            .iter()
            .map(|v| escape_value(&v.to_string()))
            .collect::<Vec<_>>()
            .join(",")
    })
}

impl ViewParams {
    pub fn parse(&self) -> Result<ViewQuery, AppError> {
        let filters = CategoryFilters {
            licensing: split_list(&self.licensing).collect(),
            year: parse_list(&self.year, "year")?,
            condition: parse_list(&self.condition, "condition")?,
            size: parse_list(&self.size, "size")?,
        };

        let collection = match self.collection.as_deref().map(str::trim) {
            None | Some("") | Some("all") => CollectionSelection::All,
            Some(raw) => raw
                .parse::<i64>()
                .map(CollectionSelection::Id)
                .map_err(|_| AppError::validation(format!("invalid collection: {raw}")))?,
        };

        let sort = match self.sort.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(field) => {
                let field = field.parse::<SortField>().map_err(AppError::validation)?;
                let direction = match self.dir.as_deref().filter(|d| !d.is_empty()) {
                    None => SortDirection::Asc,
                    Some(dir) => dir.parse::<SortDirection>().map_err(AppError::validation)?,
                };
                Some(SortSpec { field, direction })
            }
        };

        Ok(ViewQuery {
            search: self.search.clone().unwrap_or_default(),
            filters,
            collection,
            sort,
        })
    }
}

impl From<&ViewQuery> for ViewParams {
    fn from(query: &ViewQuery) -> Self {
        let f = &query.filters;
        Self {
            search: Some(query.search.trim().to_string()).filter(|s| !s.is_empty()),
            licensing: join(&f.licensing),
            year: join(&f.year),
            condition: join(&f.condition),
            size: join(&f.size),
            collection: match query.collection {
                CollectionSelection::All => None,
                CollectionSelection::Id(id) => Some(id.to_string()),
            },
            sort: query.sort.map(|s| s.field.to_string()),
            dir: query.sort.map(|s| {
                match s.direction {
                    SortDirection::Asc => "asc",
                    SortDirection::Desc => "desc",
                }
                .to_string()
            }),
        }
    }
}

impl ViewQuery {
    /// Whether an item survives search, filters and collection scoping
    pub fn admits(&self, item: &CatalogItem, collections: &[Collection]) -> bool {
        matches_search(item, &self.search)
            && self.filters.passes(item)
            && in_selection(item, self.collection, collections)
    }
}

/// Run a view over a snapshot. Without a sort, input order is kept.
pub fn apply_view<'a>(
    items: &'a [CatalogItem],
    query: &ViewQuery,
    collections: &[Collection],
) -> Vec<&'a CatalogItem> {
    let mut visible: Vec<&CatalogItem> = items
        .iter()
        .filter(|item| query.admits(item, collections))
        .collect();
    if let Some(spec) = query.sort {
        sort_items(&mut visible, spec);
    }
    visible
}
