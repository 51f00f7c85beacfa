//! Checkout
//!
//! Two-phase checkout: the order is submitted first, and payment is only
//! attempted once the order has been accepted. The cart is cleared when, and
//! only when, both phases succeed.

use std::{fmt, sync::Arc};

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    cart::{Cart, CartObserver, ValidationError},
    catalog::Catalog,
    orders::{BuyerId, OrderConfirmation, OrderError, OrderId, OrderRequest, OrderSubmitter},
    payments::{PaymentError, PaymentMethod, PaymentProcessor, PaymentReceipt, PaymentRequest},
    pricing::round_to_minor,
};

/// Errors that stop a checkout.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The cart cannot be turned into an order.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The order submitter did not accept the order.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The payment processor did not take payment.
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

/// Where a checkout currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Nothing submitted yet
    Idle,

    /// Waiting for the order submitter
    OrderPending,

    /// Order accepted, waiting for the payment processor
    PaymentPending {
        /// Accepted order
        order_id: OrderId,
    },

    /// Order placed and paid for
    Completed {
        /// Accepted order
        order_id: OrderId,

        /// Processor transaction reference
        transaction_id: Option<String>,
    },

    /// A collaborator refused the order or the payment
    Failed {
        /// Human readable cause
        reason: String,
    },
}

impl fmt::Display for CheckoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckoutState::Idle => f.write_str("idle"),
            CheckoutState::OrderPending => f.write_str("order pending"),
            CheckoutState::PaymentPending { order_id } => {
                write!(f, "payment pending for order {order_id}")
            }
            CheckoutState::Completed { order_id, .. } => write!(f, "order {order_id} completed"),
            CheckoutState::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

/// Everything produced by a successful checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutReceipt {
    /// The order as submitted
    pub request: OrderRequest,

    /// The submitter's acceptance
    pub confirmation: OrderConfirmation,

    /// The processor's receipt
    pub payment: PaymentReceipt,
}

/// Runs checkouts against an order submitter and a payment processor.
pub struct CheckoutFlow {
    orders: Arc<dyn OrderSubmitter>,
    payments: Arc<dyn PaymentProcessor>,
    method: PaymentMethod,
    state: CheckoutState,
    history: Vec<CheckoutState>,
}

impl fmt::Debug for CheckoutFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckoutFlow")
            .field("method", &self.method)
            .field("state", &self.state)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

impl CheckoutFlow {
    /// Create a flow paying with `method`.
    pub fn new(
        orders: Arc<dyn OrderSubmitter>,
        payments: Arc<dyn PaymentProcessor>,
        method: PaymentMethod,
    ) -> Self {
        Self {
            orders,
            payments,
            method,
            state: CheckoutState::Idle,
            history: vec![CheckoutState::Idle],
        }
    }

    /// Current state of the most recent checkout.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Every state entered by the most recent checkout, in order.
    pub fn history(&self) -> &[CheckoutState] {
        &self.history
    }

    /// Payment method used for new checkouts.
    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    /// Check out `cart`.
    ///
    /// The order is submitted before any payment is attempted. On success the
    /// cart is cleared; on any failure it is left exactly as it was so the
    /// buyer can retry.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`]: the cart is empty or `time_slot` is
    ///   blank. No collaborator is called.
    /// - [`CheckoutError::Order`]: the order was rejected. No payment is
    ///   attempted.
    /// - [`CheckoutError::Payment`]: the payment was declined or the
    ///   processor reported an unsuccessful payment.
    pub async fn run<O: CartObserver>(
        &mut self,
        cart: &mut Cart<O>,
        catalog: &Catalog,
        buyer_id: BuyerId,
        time_slot: &str,
    ) -> Result<CheckoutReceipt, CheckoutError> {
        self.reset();

        let request = cart.to_order_payload(buyer_id, time_slot, catalog)?;

        self.transition(CheckoutState::OrderPending);

        let confirmation = match self.orders.submit_order(&request).await {
            Ok(confirmation) => confirmation,
            Err(err) => {
                warn!(%buyer_id, error = %err, "order submission failed");

                return Err(self.fail(err));
            }
        };

        let order_id = confirmation.order_id;

        self.transition(CheckoutState::PaymentPending { order_id });

        let payment = PaymentRequest {
            order_id,
            amount: round_to_minor(request.total(), request.currency()),
            method: self.method,
        };

        let receipt = match self.payments.process_payment(&payment).await {
            Ok(receipt) if receipt.success => receipt,
            Ok(_) => {
                warn!(%order_id, "payment processor reported an unsuccessful payment");

                return Err(self.fail(PaymentError::Declined(
                    "payment was not successful".to_string(),
                )));
            }
            Err(err) => {
                warn!(%order_id, error = %err, "payment failed");

                return Err(self.fail(err));
            }
        };

        cart.clear();

        self.transition(CheckoutState::Completed {
            order_id,
            transaction_id: receipt.transaction_id.clone(),
        });

        Ok(CheckoutReceipt {
            request,
            confirmation,
            payment: receipt,
        })
    }

    fn reset(&mut self) {
        self.state = CheckoutState::Idle;
        self.history.clear();
        self.history.push(CheckoutState::Idle);
    }

    fn transition(&mut self, next: CheckoutState) {
        info!(from = %self.state, to = %next, "checkout transition");

        self.history.push(next.clone());
        self.state = next;
    }

    fn fail(&mut self, err: impl Into<CheckoutError>) -> CheckoutError {
        let err = err.into();

        self.transition(CheckoutState::Failed {
            reason: err.to_string(),
        });

        err
    }
}
