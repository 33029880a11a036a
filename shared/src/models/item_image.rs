//! Item Image Model

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Additional photo attached to a catalog item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ItemImage {
    pub id: i64,
    pub item_id: i64,
    pub url: String,
    /// At most one image per item is primary
    pub is_primary: bool,
    pub created_at: i64,
}

/// Attach image payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemImageCreate {
    #[validate(url, length(max = 2048))]
    pub url: String,
    #[serde(default)]
    pub is_primary: bool,
}
