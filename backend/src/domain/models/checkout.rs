//! Checkout domain model: the step enumeration and the ephemeral donor
//! draft collected on step 1.

use serde::{Deserialize, Serialize};

/// Linear checkout progression. Review has a back-edge to Details;
/// Confirmation is terminal for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStep {
    Details,
    Review,
    Confirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Credit,
    Etransfer,
}

/// Donor details collected on checkout step 1. Exists only for the
/// duration of the checkout session and is discarded on success or on
/// navigating away.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutDraft {
    pub donor_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    /// Dedication message, free text.
    pub wishes: String,
    pub receipt_needed: bool,
    pub payment_method: PaymentMethod,
}

impl CheckoutDraft {
    /// Gate for the Details -> Review transition. Name and email are
    /// required; address only when a tax receipt was requested. The email
    /// shape check is deliberately conservative.
    pub fn validate(&self) -> Result<(), DraftValidationError> {
        if self.donor_name.trim().is_empty() {
            return Err(DraftValidationError::MissingDonorName);
        }
        if self.email.trim().is_empty() {
            return Err(DraftValidationError::MissingEmail);
        }
        if !self.email.contains('@') {
            return Err(DraftValidationError::InvalidEmail);
        }
        if self.receipt_needed && self.address.trim().is_empty() {
            return Err(DraftValidationError::MissingAddress);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum DraftValidationError {
    #[error("Donor name is required")]
    MissingDonorName,
    #[error("Email is required")]
    MissingEmail,
    #[error("Email address looks invalid")]
    InvalidEmail,
    #[error("Mailing address is required for a tax receipt")]
    MissingAddress,
}
