//! Checkout flow: the Details -> Review -> Confirmation state machine.

use log::{error, info};
use std::sync::{Arc, Mutex};

use crate::domain::cart_service::CartService;
use crate::domain::commands::checkout::SubmitDetailsCommand;
use crate::domain::donation_flow::DonationFlowService;
use crate::domain::models::cart::CartLine;
use crate::domain::models::checkout::{CheckoutDraft, CheckoutStep, DraftValidationError};
use crate::domain::payment::{ChargeOutcome, PaymentGateway};

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CheckoutError {
    #[error("No checkout session in progress")]
    NotInCheckout,
    #[error(transparent)]
    Validation(#[from] DraftValidationError),
    #[error("Confirm payment is only available from the review step")]
    NotAtReview,
    #[error("A payment confirmation is already in flight")]
    PaymentPending,
}

/// Internal session state. The cart snapshot is taken when Details is
/// entered; cart contents cannot be edited from inside checkout.
#[derive(Debug, Clone)]
struct CheckoutState {
    step: CheckoutStep,
    draft: Option<CheckoutDraft>,
    lines: Vec<CartLine>,
    total: i64,
    error: Option<String>,
    payment_pending: bool,
}

/// Read-only view of the current checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutView {
    pub step: CheckoutStep,
    pub draft: Option<CheckoutDraft>,
    pub lines: Vec<CartLine>,
    pub total: i64,
    pub error: Option<String>,
}

/// Checkout state machine. Advances only on valid input; the confirm
/// action is disabled while a confirmation is pending so the deferred
/// success path can never run twice.
#[derive(Clone)]
pub struct CheckoutService {
    state: Arc<Mutex<Option<CheckoutState>>>,
    cart: CartService,
    flow: DonationFlowService,
    gateway: Arc<dyn PaymentGateway>,
}

impl CheckoutService {
    pub fn new(
        cart: CartService,
        flow: DonationFlowService,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(None)),
            cart,
            flow,
            gateway,
        }
    }

    /// Enter the Details step, snapshotting the cart for display through
    /// the rest of the session.
    pub fn begin(&self) {
        let lines = self.cart.lines();
        let total = self.cart.total();
        info!("Checkout: begin ({} lines, ${total})", lines.len());
        *self.state.lock().unwrap() = Some(CheckoutState {
            step: CheckoutStep::Details,
            draft: None,
            lines,
            total,
            error: None,
            payment_pending: false,
        });
    }

    /// Details -> Review, gated on the draft's required fields. A
    /// rejected submit leaves the step unchanged.
    pub fn submit_details(&self, command: SubmitDetailsCommand) -> Result<(), CheckoutError> {
        let draft = CheckoutDraft {
            donor_name: command.donor_name,
            email: command.email,
            phone: command.phone,
            address: command.address,
            wishes: command.wishes,
            receipt_needed: command.receipt_needed,
            payment_method: command.payment_method,
        };

        let mut guard = self.state.lock().unwrap();
        let state = guard.as_mut().ok_or(CheckoutError::NotInCheckout)?;

        if let Err(e) = draft.validate() {
            state.error = Some(e.to_string());
            return Err(e.into());
        }

        info!("Checkout: DETAILS -> REVIEW for '{}'", draft.donor_name);
        state.draft = Some(draft);
        state.step = CheckoutStep::Review;
        state.error = None;
        Ok(())
    }

    /// Review -> Details, unconditional; the draft is preserved.
    pub fn back_to_details(&self) -> Result<(), CheckoutError> {
        let mut guard = self.state.lock().unwrap();
        let state = guard.as_mut().ok_or(CheckoutError::NotInCheckout)?;
        state.step = CheckoutStep::Details;
        state.error = None;
        Ok(())
    }

    /// Review -> Confirmation via the payment gateway.
    ///
    /// The pending flag is set before the charge and cleared on the
    /// terminal outcome, so a second confirm while one is in flight is
    /// rejected instead of charging twice. A declined or failed charge
    /// returns the flow to Review with the draft intact.
    pub async fn confirm_payment(&self) -> Result<ChargeOutcome, CheckoutError> {
        let (amount, method) = {
            let mut guard = self.state.lock().unwrap();
            let state = guard.as_mut().ok_or(CheckoutError::NotInCheckout)?;
            if state.step != CheckoutStep::Review {
                return Err(CheckoutError::NotAtReview);
            }
            if state.payment_pending {
                return Err(CheckoutError::PaymentPending);
            }
            let draft = state.draft.as_ref().ok_or(CheckoutError::NotInCheckout)?;
            state.payment_pending = true;
            (state.total, draft.payment_method)
        };

        let outcome = self.gateway.charge(amount, method).await;

        let mut guard = self.state.lock().unwrap();
        // The session can only have been abandoned while the charge was in
        // flight; treat that as a lost session.
        let state = guard.as_mut().ok_or(CheckoutError::NotInCheckout)?;
        state.payment_pending = false;

        match &outcome {
            ChargeOutcome::Approved => {
                info!("Checkout: payment approved, REVIEW -> CONFIRMATION");
                state.step = CheckoutStep::Confirmation;
                state.error = None;
                drop(guard);
                // Clearing the cart also resets the donation flow to the
                // marketplace for the next visit.
                self.cart.clear();
            }
            ChargeOutcome::Declined(reason) => {
                error!("Checkout: payment declined: {reason}");
                state.error = Some(reason.clone());
            }
            ChargeOutcome::Error(reason) => {
                error!("Checkout: payment error: {reason}");
                state.error = Some(reason.clone());
            }
        }
        Ok(outcome)
    }

    /// Leave checkout without completing it; the draft is discarded and
    /// the flow returns to the cart.
    pub fn abandon(&self) {
        info!("Checkout: abandoned");
        *self.state.lock().unwrap() = None;
        self.flow.back_to_cart();
    }

    pub fn view(&self) -> Option<CheckoutView> {
        self.state.lock().unwrap().as_ref().map(|state| CheckoutView {
            step: state.step,
            draft: state.draft.clone(),
            lines: state.lines.clone(),
            total: state.total,
            error: state.error.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog_service::CatalogService;
    use crate::domain::models::checkout::PaymentMethod;
    use crate::domain::payment::SimulatedGateway;
    use async_trait::async_trait;
    use shared::DonationStep;
    use std::time::Duration;

    struct DecliningGateway;

    #[async_trait]
    impl PaymentGateway for DecliningGateway {
        async fn charge(&self, _amount: i64, _method: PaymentMethod) -> ChargeOutcome {
            ChargeOutcome::Declined("Card declined".to_string())
        }
    }

    fn setup(gateway: Arc<dyn PaymentGateway>) -> (CheckoutService, CartService, DonationFlowService) {
        let flow = DonationFlowService::new();
        let cart = CartService::new(flow.clone());
        let catalog = CatalogService::new();
        let item = catalog.get("light").unwrap();
        cart.add_line(&item, 100, 2, false).unwrap();
        let checkout = CheckoutService::new(cart.clone(), flow.clone(), gateway);
        (checkout, cart, flow)
    }

    fn details() -> SubmitDetailsCommand {
        SubmitDetailsCommand {
            donor_name: "Chen Meiling".to_string(),
            email: "meiling@example.com".to_string(),
            phone: String::new(),
            address: String::new(),
            wishes: "May all beings be well".to_string(),
            receipt_needed: false,
            payment_method: PaymentMethod::Credit,
        }
    }

    #[test]
    fn test_begin_snapshots_cart() {
        let (checkout, cart, _) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        checkout.begin();
        let view = checkout.view().unwrap();
        assert_eq!(view.step, CheckoutStep::Details);
        assert_eq!(view.total, cart.total());
        assert_eq!(view.lines.len(), 1);
    }

    #[test]
    fn test_details_gating_blocks_missing_fields() {
        let (checkout, _, _) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        checkout.begin();

        let mut bad = details();
        bad.donor_name = String::new();
        assert!(checkout.submit_details(bad).is_err());
        assert_eq!(checkout.view().unwrap().step, CheckoutStep::Details);

        let mut bad = details();
        bad.email = String::new();
        assert!(checkout.submit_details(bad).is_err());
        assert_eq!(checkout.view().unwrap().step, CheckoutStep::Details);

        let mut bad = details();
        bad.receipt_needed = true;
        assert!(checkout.submit_details(bad).is_err());
        assert_eq!(checkout.view().unwrap().step, CheckoutStep::Details);
    }

    #[test]
    fn test_back_to_details_preserves_draft() {
        let (checkout, _, _) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        checkout.begin();
        checkout.submit_details(details()).unwrap();
        assert_eq!(checkout.view().unwrap().step, CheckoutStep::Review);

        checkout.back_to_details().unwrap();
        let view = checkout.view().unwrap();
        assert_eq!(view.step, CheckoutStep::Details);
        assert_eq!(view.draft.unwrap().donor_name, "Chen Meiling");
    }

    #[tokio::test]
    async fn test_success_clears_cart_and_resets_flow() {
        let (checkout, cart, flow) =
            setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        flow.view_cart();
        flow.begin_checkout(false);
        checkout.begin();
        checkout.submit_details(details()).unwrap();

        let outcome = checkout.confirm_payment().await.unwrap();
        assert_eq!(outcome, ChargeOutcome::Approved);
        assert_eq!(checkout.view().unwrap().step, CheckoutStep::Confirmation);
        assert_eq!(cart.item_count(), 0);
        assert_eq!(flow.current(), DonationStep::Marketplace);
    }

    #[tokio::test]
    async fn test_confirmation_keeps_snapshot_for_display() {
        let (checkout, _, _) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        checkout.begin();
        checkout.submit_details(details()).unwrap();
        checkout.confirm_payment().await.unwrap();

        // The cleared cart must not blank the confirmation receipt.
        let view = checkout.view().unwrap();
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.total, 200);
    }

    #[tokio::test]
    async fn test_decline_returns_to_review_with_draft() {
        let (checkout, cart, _) = setup(Arc::new(DecliningGateway));
        checkout.begin();
        checkout.submit_details(details()).unwrap();

        let outcome = checkout.confirm_payment().await.unwrap();
        assert!(matches!(outcome, ChargeOutcome::Declined(_)));

        let view = checkout.view().unwrap();
        assert_eq!(view.step, CheckoutStep::Review);
        assert!(view.error.is_some());
        assert_eq!(view.draft.unwrap().donor_name, "Chen Meiling");
        // Nothing was charged, so the cart is untouched.
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn test_double_submit_is_rejected_while_pending() {
        let (checkout, _, _) = setup(Arc::new(SimulatedGateway::with_delay(
            Duration::from_millis(200),
        )));
        checkout.begin();
        checkout.submit_details(details()).unwrap();

        let first = {
            let checkout = checkout.clone();
            tokio::spawn(async move { checkout.confirm_payment().await })
        };
        // Give the first confirm time to set the pending flag.
        tokio::time::sleep(Duration::from_millis(50)).await;
        let second = checkout.confirm_payment().await;
        assert_eq!(second, Err(CheckoutError::PaymentPending));

        let first = first.await.unwrap().unwrap();
        assert_eq!(first, ChargeOutcome::Approved);
    }

    #[tokio::test]
    async fn test_confirm_requires_review_step() {
        let (checkout, _, _) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        checkout.begin();
        assert_eq!(
            checkout.confirm_payment().await,
            Err(CheckoutError::NotAtReview)
        );
    }

    #[test]
    fn test_abandon_discards_draft_and_returns_to_cart() {
        let (checkout, _, flow) = setup(Arc::new(SimulatedGateway::with_delay(Duration::ZERO)));
        flow.view_cart();
        flow.begin_checkout(false);
        checkout.begin();
        checkout.submit_details(details()).unwrap();

        checkout.abandon();
        assert!(checkout.view().is_none());
        assert_eq!(flow.current(), DonationStep::Cart);
    }
}
