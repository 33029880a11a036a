//! Bulk actions over a selection of catalog items
//!
//! A bulk request is validated as a whole before anything is written: an
//! invalid price for any one item rejects the entire request.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{AppError, ErrorCode};
use crate::models::{CatalogItem, ListingStatus, check_listing};

/// Maximum ids per bulk request
pub const MAX_BULK_IDS: usize = 200;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkAction {
    Delete,
    /// Set every selected item's status. Moving to "For Sale" takes a price
    /// per item from `prices`; any other status clears the price.
    SetStatus {
        status: ListingStatus,
        #[serde(default)]
        prices: HashMap<i64, Decimal>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkActionRequest {
    pub ids: Vec<i64>,
    pub action: BulkAction,
}

/// Ids the action was applied to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkActionResult {
    pub affected: Vec<i64>,
}

impl BulkActionRequest {
    pub fn delete(ids: Vec<i64>) -> Self {
        Self {
            ids,
            action: BulkAction::Delete,
        }
    }

    pub fn set_status(ids: Vec<i64>, status: ListingStatus, prices: HashMap<i64, Decimal>) -> Self {
        Self {
            ids,
            action: BulkAction::SetStatus { status, prices },
        }
    }

    /// Selection size and per-item price checks
    pub fn validate(&self) -> Result<(), AppError> {
        if self.ids.is_empty() {
            return Err(AppError::new(ErrorCode::BulkEmpty));
        }
        if self.ids.len() > MAX_BULK_IDS {
            return Err(AppError::with_message(
                ErrorCode::BulkTooLarge,
                format!("At most {MAX_BULK_IDS} items per bulk action"),
            )
            .with_detail("max", MAX_BULK_IDS as u64)
            .with_detail("requested", self.ids.len() as u64));
        }
        if let BulkAction::SetStatus { status, .. } = &self.action
            && status.requires_price()
        {
            for id in &self.ids {
                check_listing(*status, self.price_for(*id), Some(*id))?;
            }
        }
        Ok(())
    }

    /// Price the item will carry after this action
    pub fn price_for(&self, id: i64) -> Option<Decimal> {
        match &self.action {
            BulkAction::SetStatus { status, prices } if status.requires_price() => {
                prices.get(&id).copied()
            }
            _ => None,
        }
    }

    /// Apply to a local snapshot; returns how many items were touched
    pub fn apply_to(&self, items: &mut Vec<CatalogItem>) -> usize {
        match &self.action {
            BulkAction::Delete => {
                let before = items.len();
                items.retain(|item| !self.ids.contains(&item.id));
                before - items.len()
            }
            BulkAction::SetStatus { status, .. } => {
                let mut touched = 0;
                for item in items.iter_mut().filter(|i| self.ids.contains(&i.id)) {
                    item.listing_status = *status;
                    item.price = self.price_for(item.id);
                    touched += 1;
                }
                touched
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_support::item;

    fn snapshot() -> Vec<CatalogItem> {
        let mut items: Vec<CatalogItem> = (1..=3).map(|i| item(i, &format!("t{i}"))).collect();
        items[0].listing_status = ListingStatus::ForSale;
        items[0].price = Some(Decimal::new(40, 0));
        items
    }

    #[test]
    fn empty_selection_rejected() {
        let err = BulkActionRequest::delete(vec![]).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::BulkEmpty);
    }

    #[test]
    fn oversized_selection_rejected() {
        let ids: Vec<i64> = (0..=MAX_BULK_IDS as i64).collect();
        let err = BulkActionRequest::delete(ids).validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::BulkTooLarge);

        let ids: Vec<i64> = (0..MAX_BULK_IDS as i64).collect();
        assert!(BulkActionRequest::delete(ids).validate().is_ok());
    }

    #[test]
    fn for_sale_needs_every_price() {
        let prices = HashMap::from([(1, Decimal::new(25, 0))]);
        let req = BulkActionRequest::set_status(vec![1, 2], ListingStatus::ForSale, prices);
        let err = req.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::PriceRequired);
        assert_eq!(err.details.unwrap()["id"], serde_json::json!(2));
    }

    #[test]
    fn negative_price_rejected() {
        let prices = HashMap::from([(1, Decimal::new(-5, 0))]);
        let req = BulkActionRequest::set_status(vec![1], ListingStatus::ForSale, prices);
        assert_eq!(req.validate().unwrap_err().code, ErrorCode::InvalidPrice);
    }

    #[test]
    fn non_for_sale_status_clears_price() {
        let mut items = snapshot();
        let req = BulkActionRequest::set_status(
            vec![1, 2],
            ListingStatus::TakingOffers,
            HashMap::from([(1, Decimal::new(99, 0))]),
        );
        assert!(req.validate().is_ok());
        assert_eq!(req.apply_to(&mut items), 2);
        assert_eq!(items[0].listing_status, ListingStatus::TakingOffers);
        assert_eq!(items[0].price, None);
        assert_eq!(items[2].listing_status, ListingStatus::Private);
    }

    #[test]
    fn for_sale_sets_each_price() {
        let mut items = snapshot();
        let req = BulkActionRequest::set_status(
            vec![2, 3],
            ListingStatus::ForSale,
            HashMap::from([(2, Decimal::new(15, 0)), (3, Decimal::new(30, 0))]),
        );
        req.validate().unwrap();
        req.apply_to(&mut items);
        assert_eq!(items[1].price, Some(Decimal::new(15, 0)));
        assert_eq!(items[2].price, Some(Decimal::new(30, 0)));
    }

    #[test]
    fn delete_removes_selected() {
        let mut items = snapshot();
        assert_eq!(BulkActionRequest::delete(vec![1, 3, 42]).apply_to(&mut items), 2);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, 2);
    }

    #[test]
    fn wire_format() {
        let json = serde_json::json!({
            "ids": [5],
            "action": {"set_status": {"status": "For Sale", "prices": {"5": 12.5}}}
        });
        let req: BulkActionRequest = serde_json::from_value(json).unwrap();
        assert_eq!(req.price_for(5), Some(Decimal::new(125, 1)));

        let delete: BulkActionRequest =
            serde_json::from_str(r#"{"ids":[1,2],"action":"delete"}"#).unwrap();
        assert_eq!(delete.action, BulkAction::Delete);
    }
}
