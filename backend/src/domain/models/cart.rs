//! Cart line domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::catalog::{CatalogItem, DonationCategory};

/// One concrete pledge instance pending checkout.
///
/// Catalog fields are copied at add-time so that later catalog edits never
/// retroactively change a line already in the cart. Each add produces a new
/// line - identical selections are never merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Generated at add-time, unique per line. Distinguishes multiple lines
    /// created from the same catalog item.
    pub unique_id: String,
    pub item_id: String,
    pub title: String,
    pub description: String,
    pub min_amount: i64,
    pub image: Option<String>,
    pub category: DonationCategory,
    pub allow_installment: bool,
    /// Per-unit pledge amount chosen by the user.
    pub selected_amount: i64,
    /// Minimum 1, enforced by the store on every update.
    pub quantity: u32,
    pub is_installment: bool,
}

impl CartLine {
    /// Build a line from a catalog item plus the user's choices, with a
    /// fresh unique id.
    pub fn from_item(
        item: &CatalogItem,
        selected_amount: i64,
        quantity: u32,
        is_installment: bool,
    ) -> Self {
        Self {
            unique_id: Uuid::new_v4().to_string(),
            item_id: item.id.clone(),
            title: item.title.clone(),
            description: item.description.clone(),
            min_amount: item.min_amount,
            image: item.image.clone(),
            category: item.category,
            allow_installment: item.allow_installment,
            selected_amount,
            quantity: quantity.max(1),
            is_installment,
        }
    }

    /// Line subtotal: `selected_amount * quantity`, saturating so an
    /// absurd custom amount cannot overflow the total.
    pub fn subtotal(&self) -> i64 {
        self.selected_amount.saturating_mul(i64::from(self.quantity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::catalog::DonationCategory;

    fn light_offering() -> CatalogItem {
        CatalogItem {
            id: "light".to_string(),
            title: "Light Offering".to_string(),
            description: "Year-round light offering".to_string(),
            min_amount: 100,
            image: None,
            category: DonationCategory::Dharma,
            allow_installment: false,
        }
    }

    #[test]
    fn test_from_item_copies_catalog_fields() {
        let item = light_offering();
        let line = CartLine::from_item(&item, 200, 3, false);
        assert_eq!(line.item_id, "light");
        assert_eq!(line.min_amount, 100);
        assert_eq!(line.selected_amount, 200);
        assert_eq!(line.quantity, 3);
        assert_eq!(line.subtotal(), 600);
    }

    #[test]
    fn test_each_line_gets_its_own_unique_id() {
        let item = light_offering();
        let a = CartLine::from_item(&item, 100, 1, false);
        let b = CartLine::from_item(&item, 100, 1, false);
        assert_ne!(a.unique_id, b.unique_id);
    }

    #[test]
    fn test_subtotal_saturates_instead_of_overflowing() {
        let item = light_offering();
        let line = CartLine::from_item(&item, i64::MAX, 2, false);
        assert_eq!(line.subtotal(), i64::MAX);
    }

    #[test]
    fn test_round_trip_preserves_every_field() {
        let item = light_offering();
        let line = CartLine::from_item(&item, 250, 2, true);
        let json = serde_json::to_string(&line).unwrap();
        let back: CartLine = serde_json::from_str(&json).unwrap();
        assert_eq!(line, back);
    }
}
