//! Column sorting with a three-state toggle
//!
//! Values missing on the active field always sort after present values, in
//! both directions. Strings compare case-insensitively.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::models::CatalogItem;

/// Sortable column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Licensing,
    Year,
    Condition,
    Size,
    EstimatedValue,
    DateAdded,
    ListingStatus,
    Price,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Licensing => "licensing",
            SortField::Year => "year",
            SortField::Condition => "condition",
            SortField::Size => "size",
            SortField::EstimatedValue => "estimated_value",
            SortField::DateAdded => "date_added",
            SortField::ListingStatus => "listing_status",
            SortField::Price => "price",
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "name" => SortField::Name,
            "licensing" => SortField::Licensing,
            "year" => SortField::Year,
            "condition" => SortField::Condition,
            "size" => SortField::Size,
            "estimated_value" => SortField::EstimatedValue,
            "date_added" => SortField::DateAdded,
            "listing_status" => SortField::ListingStatus,
            "price" => SortField::Price,
            other => return Err(format!("unknown sort field: {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn asc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: SortField) -> Self {
        Self {
            field,
            direction: SortDirection::Desc,
        }
    }
}

/// Header-click state: none → asc → desc → none on the same column;
/// clicking a different column starts over at asc.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState(pub Option<SortSpec>);

impl SortState {
    pub fn toggle(&mut self, field: SortField) {
        self.0 = match self.0 {
            Some(SortSpec {
                field: current,
                direction,
            }) if current == field => match direction {
                SortDirection::Asc => Some(SortSpec::desc(field)),
                SortDirection::Desc => None,
            },
            _ => Some(SortSpec::asc(field)),
        };
    }

    pub fn spec(&self) -> Option<SortSpec> {
        self.0
    }
}

#[derive(Debug, PartialEq, PartialOrd)]
enum SortKey {
    Text(String),
    Int(i64),
    Money(Decimal),
}

fn key(item: &CatalogItem, field: SortField) -> Option<SortKey> {
    let text = |s: &str| Some(SortKey::Text(s.to_lowercase()));
    match field {
        SortField::Name => text(&item.name),
        SortField::Licensing => item.licensing.as_deref().and_then(text),
        SortField::Year => item.year.map(|y| SortKey::Int(y as i64)),
        SortField::Condition => item.condition.and_then(|c| text(c.as_str())),
        SortField::Size => item.size.and_then(|s| text(s.as_str())),
        SortField::EstimatedValue => item.estimated_value.map(SortKey::Money),
        SortField::DateAdded => Some(SortKey::Int(item.date_added)),
        SortField::ListingStatus => text(item.listing_status.as_str()),
        SortField::Price => item.price.map(SortKey::Money),
    }
}

/// Compare two items under a sort spec; missing values last in either direction
pub fn compare(a: &CatalogItem, b: &CatalogItem, spec: SortSpec) -> Ordering {
    match (key(a, spec.field), key(b, spec.field)) {
        (Some(ka), Some(kb)) => {
            let ord = ka.partial_cmp(&kb).unwrap_or(Ordering::Equal);
            match spec.direction {
                SortDirection::Asc => ord,
                SortDirection::Desc => ord.reverse(),
            }
        }
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable in-place sort
pub fn sort_items(items: &mut [&CatalogItem], spec: SortSpec) {
    items.sort_by(|a, b| compare(a, b, spec));
}
