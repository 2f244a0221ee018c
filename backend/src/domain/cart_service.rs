//! Cart store: holds the pending pledge lines and their derived totals.

use log::{info, warn};
use std::sync::{Arc, Mutex};

use crate::domain::commands::cart::UpdateQuantityCommand;
use crate::domain::donation_flow::DonationFlowService;
use crate::domain::models::cart::CartLine;
use crate::domain::models::catalog::CatalogItem;

/// In-memory cart store. Single logical thread of control: every mutation
/// is synchronous and totals are recomputed on each read.
#[derive(Clone)]
pub struct CartService {
    lines: Arc<Mutex<Vec<CartLine>>>,
    flow: DonationFlowService,
}

impl CartService {
    pub fn new(flow: DonationFlowService) -> Self {
        Self {
            lines: Arc::new(Mutex::new(Vec::new())),
            flow,
        }
    }

    /// Append a new line built from the catalog item and the user's
    /// choices. A non-positive amount is silently ignored: validating the
    /// amount is the selector's duty, the store does not re-validate.
    pub fn add_line(
        &self,
        item: &CatalogItem,
        amount: i64,
        quantity: u32,
        is_installment: bool,
    ) -> Option<CartLine> {
        if amount <= 0 {
            warn!(
                "Ignoring add_line for '{}' with non-positive amount {}",
                item.id, amount
            );
            return None;
        }
        let line = CartLine::from_item(item, amount, quantity, is_installment);
        info!(
            "Cart: added line {} ({} x{} @ ${})",
            line.unique_id, line.item_id, line.quantity, line.selected_amount
        );
        self.lines.lock().unwrap().push(line.clone());
        Some(line)
    }

    /// Remove the line with the matching unique id. No-op when absent.
    pub fn remove_line(&self, unique_id: &str) {
        let mut lines = self.lines.lock().unwrap();
        let before = lines.len();
        lines.retain(|line| line.unique_id != unique_id);
        if lines.len() < before {
            info!("Cart: removed line {}", unique_id);
        }
    }

    /// Set the quantity of a line, clamped to a floor of 1. Requests for
    /// zero or negative quantities never produce an invalid line.
    pub fn update_quantity(&self, command: UpdateQuantityCommand) {
        let quantity = command.requested_quantity.clamp(1, i64::from(u32::MAX)) as u32;
        let mut lines = self.lines.lock().unwrap();
        if let Some(line) = lines
            .iter_mut()
            .find(|line| line.unique_id == command.unique_id)
        {
            line.quantity = quantity;
        }
    }

    /// Empty the cart and reset the donation flow to the marketplace for
    /// the next visit. Fired on checkout success or an explicit
    /// cart-empty action.
    pub fn clear(&self) {
        info!("Cart: cleared");
        self.lines.lock().unwrap().clear();
        self.flow.reset_to_marketplace();
    }

    /// Sum over all lines of `selected_amount * quantity`. Saturating,
    /// like the per-line subtotal.
    pub fn total(&self) -> i64 {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .fold(0, |acc, line| acc.saturating_add(line.subtotal()))
    }

    /// Sum over all lines of `quantity`, for the cart badge.
    pub fn item_count(&self) -> u32 {
        self.lines.lock().unwrap().iter().map(|line| line.quantity).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().unwrap().is_empty()
    }

    /// Snapshot of the current lines, in insertion order.
    pub fn lines(&self) -> Vec<CartLine> {
        self.lines.lock().unwrap().clone()
    }
}
