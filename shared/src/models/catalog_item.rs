//! Catalog Item Model
//!
//! One cataloged t-shirt. Enum wire strings match the labels shown in the UI
//! ("For Sale", "Like New", ...), so stored rows and JSON payloads share one
//! representation.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Error returned when a stored or submitted label does not match any variant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($variant:ident => $label:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// All variants in display order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire/storage label
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

label_enum! {
    /// Marketplace visibility of an item
    ListingStatus, "listing status" {
        Public => "Public",
        Private => "Private",
        ForSale => "For Sale",
        TakingOffers => "Taking Offers",
    }
}

label_enum! {
    /// Physical condition grade
    Condition, "condition" {
        New => "New",
        LikeNew => "Like New",
        Excellent => "Excellent",
        Good => "Good",
        Fair => "Fair",
        Poor => "Poor",
    }
}

label_enum! {
    /// Tagged garment size
    Size, "size" {
        XS => "XS",
        S => "S",
        M => "M",
        L => "L",
        XL => "XL",
        XXL => "XXL",
        XXXL => "XXXL",
        Youth => "Youth",
        Other => "Other",
    }
}

impl ListingStatus {
    /// Whether this status requires a price to be set
    pub fn requires_price(&self) -> bool {
        matches!(self, ListingStatus::ForSale)
    }

    /// Whether a price may be kept alongside this status
    pub fn keeps_price(&self) -> bool {
        matches!(self, ListingStatus::ForSale | ListingStatus::TakingOffers)
    }
}

impl Default for ListingStatus {
    fn default() -> Self {
        ListingStatus::Private
    }
}

/// Flat measurements in inches
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub chest: Option<f64>,
    pub length: Option<f64>,
    pub sleeve: Option<f64>,
}

/// Where and when the item was acquired
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub purchase_price: Option<Decimal>,
}

/// Catalog item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    /// Licensing/brand (band, franchise, label)
    pub licensing: Option<String>,
    pub year: Option<i32>,
    pub condition: Option<Condition>,
    pub size: Option<Size>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Primary image URL
    pub image: Option<String>,
    pub description: Option<String>,
    /// Unix millis
    pub date_added: i64,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub estimated_value: Option<Decimal>,
    pub listing_status: ListingStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub collection_id: Option<i64>,
    pub measurements: Option<Measurements>,
    pub acquisition: Option<Acquisition>,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CatalogItemCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 200))]
    pub licensing: Option<String>,
    #[validate(range(min = 1800, max = 2200))]
    pub year: Option<i32>,
    pub condition: Option<Condition>,
    pub size: Option<Size>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub estimated_value: Option<Decimal>,
    pub listing_status: Option<ListingStatus>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub collection_id: Option<i64>,
    pub measurements: Option<Measurements>,
    pub acquisition: Option<Acquisition>,
}

/// Update item payload
///
/// Absent fields are left untouched. `price` and `collection_id` distinguish
/// "absent" (`None`) from an explicit `null` (`Some(None)`), which clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CatalogItemUpdate {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 200))]
    pub licensing: Option<String>,
    #[validate(range(min = 1800, max = 2200))]
    pub year: Option<i32>,
    pub condition: Option<Condition>,
    pub size: Option<Size>,
    pub tags: Option<Vec<String>>,
    #[validate(length(max = 2048))]
    pub image: Option<String>,
    #[validate(length(max = 5000))]
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub estimated_value: Option<Decimal>,
    pub listing_status: Option<ListingStatus>,
    #[serde(
        default,
        deserialize_with = "double_option_decimal",
        serialize_with = "serialize_double_option_decimal",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Option<Decimal>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_id: Option<Option<i64>>,
    pub measurements: Option<Measurements>,
    pub acquisition: Option<Acquisition>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn serialize_double_option_decimal<S>(
    value: &Option<Option<Decimal>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match value {
        Some(inner) => rust_decimal::serde::float_option::serialize(inner, serializer),
        None => serializer.serialize_none(),
    }
}

fn double_option_decimal<'de, D>(deserializer: D) -> Result<Option<Option<Decimal>>, D::Error>
where
    D: Deserializer<'de>,
{
    rust_decimal::serde::float_option::deserialize(deserializer).map(Some)
}

/// Trim tags, drop empty ones and remove duplicates (case-sensitive, first wins)
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

impl CatalogItem {
    /// Apply an update payload in place (used for optimistic local edits)
    pub fn apply_update(&mut self, update: &CatalogItemUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(licensing) = &update.licensing {
            self.licensing = Some(licensing.clone());
        }
        if let Some(year) = update.year {
            self.year = Some(year);
        }
        if let Some(condition) = update.condition {
            self.condition = Some(condition);
        }
        if let Some(size) = update.size {
            self.size = Some(size);
        }
        if let Some(tags) = &update.tags {
            self.tags = normalize_tags(tags);
        }
        if let Some(image) = &update.image {
            self.image = Some(image.clone());
        }
        if let Some(description) = &update.description {
            self.description = Some(description.clone());
        }
        if let Some(value) = update.estimated_value {
            self.estimated_value = Some(value);
        }
        if let Some(status) = update.listing_status {
            self.listing_status = status;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(collection_id) = update.collection_id {
            self.collection_id = collection_id;
        }
        if let Some(measurements) = &update.measurements {
            self.measurements = Some(measurements.clone());
        }
        if let Some(acquisition) = &update.acquisition {
            self.acquisition = Some(acquisition.clone());
        }
    }

    /// Listing status / price consistency: "For Sale" needs a non-negative price
    pub fn check_listing(&self) -> Result<(), crate::error::AppError> {
        check_listing(self.listing_status, self.price, Some(self.id))
    }
}

/// Validate a status/price pair
pub fn check_listing(
    status: ListingStatus,
    price: Option<Decimal>,
    id: Option<i64>,
) -> Result<(), crate::error::AppError> {
    if let Some(p) = price
        && p.is_sign_negative()
    {
        return Err(crate::error::AppError::new(
            crate::error::ErrorCode::InvalidPrice,
        ));
    }
    if status.requires_price() && price.is_none() {
        return Err(crate::error::AppError::price_required(id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn item() -> CatalogItem {
        CatalogItem {
            id: 1,
            user_id: Uuid::nil(),
            name: "Tour 1994".into(),
            licensing: None,
            year: Some(1994),
            condition: Some(Condition::Good),
            size: Some(Size::L),
            tags: vec!["band".into()],
            image: None,
            description: None,
            date_added: 0,
            estimated_value: None,
            listing_status: ListingStatus::Private,
            price: None,
            collection_id: Some(9),
            measurements: None,
            acquisition: None,
        }
    }

    #[test]
    fn listing_status_labels() {
        assert_eq!(ListingStatus::ForSale.as_str(), "For Sale");
        assert_eq!(
            "Taking Offers".parse::<ListingStatus>().unwrap(),
            ListingStatus::TakingOffers
        );
        assert!("for sale".parse::<ListingStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&ListingStatus::ForSale).unwrap(),
            "\"For Sale\""
        );
        assert_eq!(
            serde_json::from_str::<Condition>("\"Like New\"").unwrap(),
            Condition::LikeNew
        );
    }

    #[test]
    fn unknown_variant_message() {
        let err = "Huge".parse::<Size>().unwrap_err();
        assert_eq!(err.to_string(), "unknown size: Huge");
    }

    #[test]
    fn normalize_tags_trims_and_dedups_case_sensitively() {
        let tags = vec![
            " metal ".to_string(),
            "Metal".to_string(),
            "metal".to_string(),
            "".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(normalize_tags(&tags), vec!["metal", "Metal"]);
    }

    #[test]
    fn update_distinguishes_absent_and_null() {
        let absent: CatalogItemUpdate = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.price, None);
        assert_eq!(absent.collection_id, None);

        let cleared: CatalogItemUpdate =
            serde_json::from_str(r#"{"price":null,"collection_id":null}"#).unwrap();
        assert_eq!(cleared.price, Some(None));
        assert_eq!(cleared.collection_id, Some(None));

        let set: CatalogItemUpdate = serde_json::from_str(r#"{"price":25.5}"#).unwrap();
        assert_eq!(set.price, Some(Some(Decimal::new(255, 1))));
    }

    #[test]
    fn apply_update_clears_nullable_fields() {
        let mut it = item();
        it.price = Some(Decimal::new(10, 0));
        let update = CatalogItemUpdate {
            price: Some(None),
            collection_id: Some(None),
            tags: Some(vec!["a".into(), "a".into()]),
            ..Default::default()
        };
        it.apply_update(&update);
        assert_eq!(it.price, None);
        assert_eq!(it.collection_id, None);
        assert_eq!(it.tags, vec!["a"]);
        assert_eq!(it.name, "Tour 1994");
    }

    #[test]
    fn for_sale_requires_price() {
        let mut it = item();
        it.listing_status = ListingStatus::ForSale;
        assert_eq!(it.check_listing().unwrap_err().code, ErrorCode::PriceRequired);

        it.price = Some(Decimal::new(20, 0));
        assert!(it.check_listing().is_ok());

        it.price = Some(Decimal::new(-1, 0));
        assert_eq!(it.check_listing().unwrap_err().code, ErrorCode::InvalidPrice);
    }

    #[test]
    fn create_payload_validation() {
        let payload = CatalogItemCreate {
            name: String::new(),
            licensing: None,
            year: Some(1200),
            condition: None,
            size: None,
            tags: None,
            image: None,
            description: None,
            estimated_value: None,
            listing_status: None,
            price: None,
            collection_id: None,
            measurements: None,
            acquisition: None,
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("year"));
    }
}
