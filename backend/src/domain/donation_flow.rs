//! Donation flow controller: the three-way step state sequencing
//! marketplace browsing, cart review and checkout.

use log::{info, warn};
use shared::DonationStep;
use std::sync::{Arc, Mutex};

/// Controller for the donate section's step state.
///
/// Kept in memory only. Navigating to the donate section from anywhere on
/// the site always resets to Marketplace - there is no deep-linking into
/// Cart or Checkout.
#[derive(Clone)]
pub struct DonationFlowService {
    step: Arc<Mutex<DonationStep>>,
}

impl DonationFlowService {
    pub fn new() -> Self {
        Self {
            step: Arc::new(Mutex::new(DonationStep::Marketplace)),
        }
    }

    pub fn current(&self) -> DonationStep {
        *self.step.lock().unwrap()
    }

    /// "View cart" from the marketplace.
    pub fn view_cart(&self) {
        info!("Donation flow: -> CART");
        *self.step.lock().unwrap() = DonationStep::Cart;
    }

    /// "Continue shopping" from the cart view. Note that emptying the cart
    /// by removals does NOT trigger this - the cart view shows an
    /// empty-state instead.
    pub fn continue_shopping(&self) {
        info!("Donation flow: -> MARKETPLACE");
        *self.step.lock().unwrap() = DonationStep::Marketplace;
    }

    /// "Checkout" from the cart. The state model itself does not hard-block
    /// an empty cart; the UI affordance is expected to be absent then, so
    /// an empty-cart entry is only worth a warning.
    pub fn begin_checkout(&self, cart_is_empty: bool) {
        if cart_is_empty {
            warn!("Donation flow: entering CHECKOUT with an empty cart");
        }
        info!("Donation flow: -> CHECKOUT");
        *self.step.lock().unwrap() = DonationStep::Checkout;
    }

    /// "Back" from step 1 of checkout.
    pub fn back_to_cart(&self) {
        info!("Donation flow: -> CART (back from checkout)");
        *self.step.lock().unwrap() = DonationStep::Cart;
    }

    /// Reset to Marketplace. Fired when the user navigates to the donate
    /// section via the site navigation, and on checkout success.
    pub fn reset_to_marketplace(&self) {
        *self.step.lock().unwrap() = DonationStep::Marketplace;
    }
}

impl Default for DonationFlowService {
    fn default() -> Self {
        Self::new()
    }
}
