//! Marketplace selector: the per-item selection session that produces a
//! cart line.

use anyhow::{anyhow, Result};
use log::info;
use std::sync::{Arc, Mutex};

use crate::domain::cart_service::CartService;
use crate::domain::catalog_service::CatalogService;
use crate::domain::models::cart::CartLine;
use crate::domain::models::catalog::CatalogItem;

/// State of one item-selection session. Exactly one amount source is
/// active at a time: a preset multiple of the item's floor, or a custom
/// free-text amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionSession {
    pub item: CatalogItem,
    /// The per-unit amount currently chosen.
    pub amount: i64,
    /// Raw custom-amount text; `None` while a preset is active.
    pub custom_amount: Option<String>,
    pub quantity: u32,
    pub is_installment: bool,
}

impl SelectionSession {
    fn open(item: CatalogItem) -> Self {
        let amount = item.min_amount;
        Self {
            item,
            amount,
            custom_amount: None,
            quantity: 1,
            is_installment: false,
        }
    }

    /// Running total shown in the selection modal. Saturates; the custom
    /// amount field accepts arbitrarily large numbers.
    pub fn total(&self) -> i64 {
        self.amount.saturating_mul(i64::from(self.quantity))
    }
}

/// One modal/session at a time; opening a new item replaces any session
/// left behind.
#[derive(Clone)]
pub struct SelectionService {
    session: Arc<Mutex<Option<SelectionSession>>>,
    catalog: CatalogService,
    cart: CartService,
}

impl SelectionService {
    pub fn new(catalog: CatalogService, cart: CartService) -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
            catalog,
            cart,
        }
    }

    /// Open a selection session for a catalog item: amount starts at the
    /// item's floor, quantity at 1, installment off, custom text cleared.
    pub fn open(&self, item_id: &str) -> Result<SelectionSession> {
        let item = self
            .catalog
            .get(item_id)
            .ok_or_else(|| anyhow!("Unknown catalog item '{item_id}'"))?;
        info!("Selection: opened '{}'", item.id);
        let session = SelectionSession::open(item);
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    /// Pick one of the three preset multiples of the item floor (x1, x2,
    /// x5). Selecting a preset clears the custom field.
    pub fn choose_preset(&self, multiplier: u32) -> Result<()> {
        if !matches!(multiplier, 1 | 2 | 5) {
            return Err(anyhow!("Preset multiplier must be 1, 2 or 5"));
        }
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.amount = session.item.min_amount * i64::from(multiplier);
        session.custom_amount = None;
        Ok(())
    }

    /// Enter a free-text custom amount; it becomes the active amount
    /// source and deselects any preset. Unparsable text leaves the amount
    /// at zero, which the confirm guard then blocks.
    pub fn enter_custom(&self, text: &str) -> Result<()> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.amount = text.trim().parse::<i64>().unwrap_or(0);
        session.custom_amount = Some(text.to_string());
        Ok(())
    }

    /// Integer stepper with a floor of 1 and no ceiling.
    pub fn set_quantity(&self, quantity: u32) -> Result<()> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.quantity = quantity.max(1);
        Ok(())
    }

    pub fn increment_quantity(&self) -> Result<()> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.quantity = session.quantity.saturating_add(1);
        Ok(())
    }

    pub fn decrement_quantity(&self) -> Result<()> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.quantity = session.quantity.saturating_sub(1).max(1);
        Ok(())
    }

    /// The installment flag is only honored when the item allows it;
    /// otherwise the session keeps it off.
    pub fn set_installment(&self, flag: bool) -> Result<()> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_mut()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        session.is_installment = flag && session.item.allow_installment;
        Ok(())
    }

    /// Confirm the selection: guarded by `amount > 0`. On success the line
    /// is added to the cart and the session closes.
    pub fn confirm(&self) -> Result<CartLine> {
        let mut guard = self.session.lock().unwrap();
        let session = guard
            .as_ref()
            .ok_or_else(|| anyhow!("No selection session open"))?;
        if session.amount <= 0 {
            return Err(anyhow!("Amount must be positive"));
        }
        let line = self
            .cart
            .add_line(
                &session.item,
                session.amount,
                session.quantity,
                session.is_installment,
            )
            .ok_or_else(|| anyhow!("Amount must be positive"))?;
        info!("Selection: confirmed '{}' into cart", session.item.id);
        *guard = None;
        Ok(line)
    }

    /// Discard the session without touching the cart.
    pub fn cancel(&self) {
        *self.session.lock().unwrap() = None;
    }

    pub fn current(&self) -> Option<SelectionSession> {
        self.session.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::donation_flow::DonationFlowService;

    fn service() -> (SelectionService, CartService) {
        let cart = CartService::new(DonationFlowService::new());
        let selection = SelectionService::new(CatalogService::new(), cart.clone());
        (selection, cart)
    }

    #[test]
    fn test_open_initializes_from_item_floor() {
        let (selection, _) = service();
        let session = selection.open("light").unwrap();
        assert_eq!(session.amount, 100);
        assert_eq!(session.quantity, 1);
        assert!(!session.is_installment);
        assert_eq!(session.custom_amount, None);
    }

    #[test]
    fn test_preset_and_custom_are_mutually_exclusive() {
        let (selection, _) = service();
        selection.open("light").unwrap();

        selection.enter_custom("777").unwrap();
        let s = selection.current().unwrap();
        assert_eq!(s.amount, 777);
        assert_eq!(s.custom_amount.as_deref(), Some("777"));

        selection.choose_preset(2).unwrap();
        let s = selection.current().unwrap();
        assert_eq!(s.amount, 200);
        assert_eq!(s.custom_amount, None);
    }

    #[test]
    fn test_invalid_preset_multiplier_rejected() {
        let (selection, _) = service();
        selection.open("light").unwrap();
        assert!(selection.choose_preset(3).is_err());
    }

    #[test]
    fn test_quantity_stepper_floors_at_one() {
        let (selection, _) = service();
        selection.open("light").unwrap();
        selection.decrement_quantity().unwrap();
        assert_eq!(selection.current().unwrap().quantity, 1);
        selection.increment_quantity().unwrap();
        selection.increment_quantity().unwrap();
        assert_eq!(selection.current().unwrap().quantity, 3);
    }

    #[test]
    fn test_installment_ignored_when_item_disallows() {
        let (selection, _) = service();
        // 'light' does not allow installment.
        selection.open("light").unwrap();
        selection.set_installment(true).unwrap();
        assert!(!selection.current().unwrap().is_installment);

        // 'buddha' does.
        selection.open("buddha").unwrap();
        selection.set_installment(true).unwrap();
        assert!(selection.current().unwrap().is_installment);
    }

    #[test]
    fn test_total_saturates_on_huge_custom_amount() {
        let (selection, _) = service();
        selection.open("light").unwrap();
        selection.enter_custom(&i64::MAX.to_string()).unwrap();
        selection.set_quantity(2).unwrap();
        assert_eq!(selection.current().unwrap().total(), i64::MAX);
    }

    #[test]
    fn test_confirm_guards_on_positive_amount() {
        let (selection, cart) = service();
        selection.open("light").unwrap();
        selection.enter_custom("not a number").unwrap();
        assert!(selection.confirm().is_err());
        assert!(cart.is_empty());
        // Session survives the failed confirm so the user can fix it.
        assert!(selection.current().is_some());
    }

    #[test]
    fn test_confirm_adds_line_and_closes_session() {
        let (selection, cart) = service();
        selection.open("light").unwrap();
        selection.choose_preset(2).unwrap();
        selection.set_quantity(3).unwrap();

        let line = selection.confirm().unwrap();
        assert_eq!(line.selected_amount, 200);
        assert_eq!(line.quantity, 3);
        assert_eq!(cart.total(), 600);
        assert!(selection.current().is_none());
    }
}
