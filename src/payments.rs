//! Payments

use std::fmt;

use async_trait::async_trait;
use clap::ValueEnum;
use mockall::automock;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::orders::OrderId;

/// Errors returned by a payment processor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    /// The payment was not taken.
    #[error("payment declined: {0}")]
    Declined(String),
}

/// How the buyer pays.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    /// Unified Payments Interface
    #[default]
    Upi,

    /// Debit or credit card
    Card,

    /// Stored-value wallet
    Wallet,

    /// Cash at the counter
    Cash,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Card => "CARD",
            PaymentMethod::Wallet => "WALLET",
            PaymentMethod::Cash => "CASH",
        })
    }
}

/// Request to pay for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentRequest {
    /// Order being paid for
    pub order_id: OrderId,

    /// Amount in major units, rounded to the currency's minor unit
    pub amount: Decimal,

    /// Payment method
    pub method: PaymentMethod,
}

/// Outcome reported by a payment processor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    /// Whether the payment was taken
    pub success: bool,

    /// Processor transaction reference, present on success
    pub transaction_id: Option<String>,
}

impl PaymentReceipt {
    /// A successful receipt carrying `transaction_id`.
    pub fn approved(transaction_id: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_id: Some(transaction_id.into()),
        }
    }
}

/// Takes payment for accepted orders.
#[automock]
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Charge the buyer for an order.
    async fn process_payment(
        &self,
        payment: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError>;
}
