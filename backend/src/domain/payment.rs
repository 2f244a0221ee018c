//! Payment gateway seam.
//!
//! The checkout state machine only ever talks to the [`PaymentGateway`]
//! trait, so the bundled simulated gateway can be swapped for a real
//! integration without touching the state machine.

use async_trait::async_trait;
use log::info;
use std::time::Duration;

use crate::domain::models::checkout::PaymentMethod;

/// Terminal outcome of a charge attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ChargeOutcome {
    Approved,
    /// The gateway refused the charge (e.g. card declined).
    Declined(String),
    /// The charge could not be attempted (transport failure etc.).
    Error(String),
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Attempt to charge `amount` with the chosen method. Completes
    /// exactly once; the caller is responsible for preventing concurrent
    /// in-flight charges.
    async fn charge(&self, amount: i64, method: PaymentMethod) -> ChargeOutcome;
}

/// Gateway stub that waits a fixed delay and approves every charge.
pub struct SimulatedGateway {
    delay: Duration,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self {
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self { delay }
    }
}

impl Default for SimulatedGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PaymentGateway for SimulatedGateway {
    async fn charge(&self, amount: i64, method: PaymentMethod) -> ChargeOutcome {
        tokio::time::sleep(self.delay).await;
        info!("Simulated gateway: approved ${amount} via {method:?}");
        ChargeOutcome::Approved
    }
}
