//! Catalog domain model: the registry of donation offerings.

use serde::{Deserialize, Serialize};

/// Donation category of a catalog offering. Used only for the marketplace
/// filter tabs - no business rule hangs off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DonationCategory {
    Construction,
    Dharma,
    Charity,
    Academy,
}

/// Marketplace category filter. Pure read-side filter over the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryTab {
    #[default]
    All,
    /// Charity and academy offerings grouped together.
    General,
    /// Dharma service offerings.
    Ceremony,
    Construction,
}

impl DonationCategory {
    /// Whether this category is shown under the given marketplace tab.
    pub fn in_tab(self, tab: CategoryTab) -> bool {
        match tab {
            CategoryTab::All => true,
            CategoryTab::General => {
                matches!(self, DonationCategory::Charity | DonationCategory::Academy)
            }
            CategoryTab::Ceremony => matches!(self, DonationCategory::Dharma),
            CategoryTab::Construction => matches!(self, DonationCategory::Construction),
        }
    }
}

/// A donation offering. Immutable from the cart subsystem's perspective:
/// cart lines copy these fields rather than referencing them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Floor for any pledge against this item.
    pub min_amount: i64,
    pub image: Option<String>,
    pub category: DonationCategory,
    pub allow_installment: bool,
}

impl CatalogItem {
    /// Check the registry invariants before an item is admitted.
    pub fn validate(&self) -> Result<(), CatalogValidationError> {
        if self.title.trim().is_empty() {
            return Err(CatalogValidationError::EmptyTitle);
        }
        if self.min_amount <= 0 {
            return Err(CatalogValidationError::NonPositiveMinAmount);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CatalogValidationError {
    #[error("Title cannot be empty")]
    EmptyTitle,
    #[error("Minimum amount must be positive")]
    NonPositiveMinAmount,
}
