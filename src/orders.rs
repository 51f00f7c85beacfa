//! Orders

use std::{collections::BTreeMap, fmt, num::NonZeroU32};

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    cart::totals::{CartTotals, LineItem},
    catalog::MenuItemId,
};

/// Errors returned by an order submitter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderError {
    /// The order was not accepted.
    #[error("order rejected: {0}")]
    Rejected(String),
}

/// Buyer identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuyerId(u64);

impl BuyerId {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for BuyerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Order identifier assigned by the submitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    /// Wrap a raw identifier.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Lifecycle status of a placed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderStatus {
    /// Accepted by the kitchen, awaiting payment
    Placed,

    /// Paid for
    Paid,

    /// Collected
    Completed,

    /// Cancelled
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OrderStatus::Placed => "PLACED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        })
    }
}

/// Immutable snapshot of a cart, submitted once per checkout attempt.
///
/// The request owns copies of the cart's lines, so mutating the cart after
/// the request was built cannot change what gets submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRequest {
    buyer_id: BuyerId,
    items: BTreeMap<MenuItemId, NonZeroU32>,
    time_slot: String,
    totals: CartTotals,
}

impl OrderRequest {
    pub(crate) fn new(
        buyer_id: BuyerId,
        items: BTreeMap<MenuItemId, NonZeroU32>,
        time_slot: String,
        totals: CartTotals,
    ) -> Self {
        Self {
            buyer_id,
            items,
            time_slot,
            totals,
        }
    }

    /// Buyer placing the order.
    pub fn buyer_id(&self) -> BuyerId {
        self.buyer_id
    }

    /// Requested quantities keyed by item.
    pub fn items(&self) -> &BTreeMap<MenuItemId, NonZeroU32> {
        &self.items
    }

    /// Pickup or delivery slot token.
    pub fn time_slot(&self) -> &str {
        &self.time_slot
    }

    /// Priced lines at submission time.
    pub fn line_items(&self) -> &[LineItem] {
        self.totals.line_items()
    }

    /// Totals at submission time.
    pub fn totals(&self) -> &CartTotals {
        &self.totals
    }

    /// Total including tax, unrounded.
    pub fn total(&self) -> Decimal {
        self.totals.total()
    }

    /// Currency of the total.
    pub fn currency(&self) -> &'static Currency {
        self.totals.currency()
    }
}

/// The submitter's answer to an accepted order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Assigned identifier
    pub order_id: OrderId,

    /// Status after acceptance
    pub status: OrderStatus,

    /// Amount the submitter expects to be paid
    pub total_amount: Decimal,

    /// When the order was accepted
    pub placed_at: Timestamp,
}

/// Accepts finalized orders.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Submit an order for acceptance.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, OrderError>;
}
