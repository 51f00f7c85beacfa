//! In-memory backend
//!
//! Serves a fixed menu and keeps orders in process memory. Used for demos,
//! for the CLI when no API is configured, and by the integration tests.

use async_trait::async_trait;
use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    cart::{CartTotals, default_tax_rate},
    catalog::{Catalog, CatalogError, CatalogProvider},
    orders::{
        BuyerId, OrderConfirmation, OrderError, OrderId, OrderRequest, OrderStatus, OrderSubmitter,
    },
    payments::{PaymentError, PaymentMethod, PaymentProcessor, PaymentReceipt, PaymentRequest},
    pricing::round_to_minor,
};

/// Largest difference between a payment and its order total that still counts as a match.
fn payment_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// An order held by the in-memory backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredOrder {
    /// Buyer who placed it
    pub buyer_id: BuyerId,

    /// Total including tax, rounded to minor units
    pub total: Decimal,

    /// Current status
    pub status: OrderStatus,

    /// Pickup slot
    pub time_slot: String,

    /// Payment method, once paid
    pub paid_with: Option<PaymentMethod>,

    /// Processor reference, once paid
    pub transaction_id: Option<String>,
}

#[derive(Debug, Default)]
struct Ledger {
    last_id: u64,
    orders: FxHashMap<OrderId, StoredOrder>,
}

/// Catalog, order and payment collaborator backed by process memory.
#[derive(Debug)]
pub struct InMemoryBackend {
    catalog: Catalog,
    tax_rate: Percentage,
    ledger: Mutex<Ledger>,
}

impl InMemoryBackend {
    /// Serve `catalog`, charging `tax_rate` on every order.
    pub fn new(catalog: Catalog, tax_rate: Percentage) -> Self {
        Self {
            catalog,
            tax_rate,
            ledger: Mutex::new(Ledger::default()),
        }
    }

    /// Serve the bundled default menu at the default tax rate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled menu fixture is invalid.
    pub fn with_default_menu() -> Result<Self, CatalogError> {
        Ok(Self::new(Catalog::default_menu()?, default_tax_rate()))
    }

    /// Look up a stored order.
    pub async fn order(&self, order_id: OrderId) -> Option<StoredOrder> {
        self.ledger.lock().await.orders.get(&order_id).cloned()
    }

    /// Current status of an order.
    pub async fn order_status(&self, order_id: OrderId) -> Option<OrderStatus> {
        self.order(order_id).await.map(|order| order.status)
    }

    /// Every order a buyer has placed, oldest first.
    pub async fn orders_for(&self, buyer_id: BuyerId) -> Vec<(OrderId, StoredOrder)> {
        let ledger = self.ledger.lock().await;

        let mut orders: Vec<_> = ledger
            .orders
            .iter()
            .filter(|(_, order)| order.buyer_id == buyer_id)
            .map(|(&order_id, order)| (order_id, order.clone()))
            .collect();

        orders.sort_unstable_by_key(|(order_id, _)| *order_id);

        orders
    }

    fn check_items(&self, order: &OrderRequest) -> Result<(), OrderError> {
        if order.items().is_empty() {
            return Err(OrderError::Rejected("order has no items".to_string()));
        }

        for &item_id in order.items().keys() {
            let Some(item) = self.catalog.get(item_id) else {
                return Err(OrderError::Rejected(format!("unknown menu item {item_id}")));
            };

            if !item.available {
                return Err(OrderError::Rejected(format!(
                    "{} is not available",
                    item.name
                )));
            }
        }

        Ok(())
    }
}

#[async_trait]
impl CatalogProvider for InMemoryBackend {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
        Ok(self.catalog.clone())
    }
}

#[async_trait]
impl OrderSubmitter for InMemoryBackend {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, OrderError> {
        if let Err(err) = self.check_items(order) {
            warn!(buyer_id = %order.buyer_id(), error = %err, "rejecting order");

            return Err(err);
        }

        let lines = order
            .items()
            .iter()
            .map(|(&item_id, &quantity)| (item_id, quantity));

        let totals = CartTotals::compute(lines, &self.catalog, self.tax_rate);
        let total = round_to_minor(totals.total(), self.catalog.currency());

        let mut ledger = self.ledger.lock().await;

        ledger.last_id += 1;

        let order_id = OrderId::new(ledger.last_id);

        ledger.orders.insert(
            order_id,
            StoredOrder {
                buyer_id: order.buyer_id(),
                total,
                status: OrderStatus::Placed,
                time_slot: order.time_slot().to_string(),
                paid_with: None,
                transaction_id: None,
            },
        );

        info!(%order_id, buyer_id = %order.buyer_id(), %total, "order placed");

        Ok(OrderConfirmation {
            order_id,
            status: OrderStatus::Placed,
            total_amount: total,
            placed_at: Timestamp::now(),
        })
    }
}

#[async_trait]
impl PaymentProcessor for InMemoryBackend {
    async fn process_payment(
        &self,
        payment: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError> {
        let mut ledger = self.ledger.lock().await;

        let Some(order) = ledger.orders.get_mut(&payment.order_id) else {
            return Err(PaymentError::Declined(format!(
                "order {} not found",
                payment.order_id
            )));
        };

        if order.status == OrderStatus::Paid {
            return Err(PaymentError::Declined(format!(
                "order {} is already paid",
                payment.order_id
            )));
        }

        if (order.total - payment.amount).abs() > payment_tolerance() {
            return Err(PaymentError::Declined(format!(
                "amount {} does not match order total {}",
                payment.amount, order.total
            )));
        }

        let transaction_id = format!("TXN{}", Uuid::now_v7().simple());

        order.status = OrderStatus::Paid;
        order.paid_with = Some(payment.method);
        order.transaction_id = Some(transaction_id.clone());

        info!(
            order_id = %payment.order_id,
            %transaction_id,
            method = %payment.method,
            "payment taken"
        );

        Ok(PaymentReceipt::approved(transaction_id))
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        cart::Cart,
        catalog::{MenuItemId, tests::item},
    };

    use super::*;

    const SLOT: &str = "12:30-12:45";

    fn backend() -> TestResult<InMemoryBackend> {
        let mut unavailable = item(3, "Masala Dosa", 50_00);

        unavailable.available = false;

        let catalog = Catalog::new(
            iso::INR,
            [item(1, "Veg Thali", 80_00), item(2, "Chapati & Curry", 40_00), unavailable],
        )?;

        Ok(InMemoryBackend::new(catalog, default_tax_rate()))
    }

    fn request(backend: &InMemoryBackend, lines: &[(u32, i64)]) -> TestResult<OrderRequest> {
        let mut cart = Cart::new();

        for &(id, quantity) in lines {
            cart.set_quantity(MenuItemId::new(id), quantity);
        }

        Ok(cart.to_order_payload(BuyerId::new(1), SLOT, &backend.catalog)?)
    }

    fn payment(order_id: OrderId, amount: Decimal) -> PaymentRequest {
        PaymentRequest {
            order_id,
            amount,
            method: PaymentMethod::Upi,
        }
    }

    #[tokio::test]
    async fn default_menu_serves_six_items() -> TestResult {
        let backend = InMemoryBackend::with_default_menu()?;

        assert_eq!(backend.fetch_catalog().await?.len(), 6);

        Ok(())
    }

    #[tokio::test]
    async fn orders_get_sequential_ids_and_server_totals() -> TestResult {
        let backend = backend()?;

        let first = backend.submit_order(&request(&backend, &[(1, 2), (2, 1)])?).await?;
        let second = backend.submit_order(&request(&backend, &[(2, 1)])?).await?;

        assert_eq!(first.order_id, OrderId::new(1));
        assert_eq!(second.order_id, OrderId::new(2));
        assert_eq!(first.status, OrderStatus::Placed);
        assert_eq!(first.total_amount, Decimal::new(210, 0));
        assert_eq!(second.total_amount, Decimal::new(42, 0));
        assert_eq!(backend.orders_for(BuyerId::new(1)).await.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn orders_for_unknown_or_unavailable_items_are_rejected() -> TestResult {
        let backend = backend()?;

        let unknown = backend.submit_order(&request(&backend, &[(1, 1), (99, 1)])?).await;

        assert_eq!(
            unknown,
            Err(OrderError::Rejected("unknown menu item 99".to_string()))
        );

        let unavailable = backend.submit_order(&request(&backend, &[(3, 1)])?).await;

        assert_eq!(
            unavailable,
            Err(OrderError::Rejected("Masala Dosa is not available".to_string()))
        );

        Ok(())
    }

    #[tokio::test]
    async fn payment_marks_order_paid_once() -> TestResult {
        let backend = backend()?;
        let order = backend.submit_order(&request(&backend, &[(1, 2), (2, 1)])?).await?;

        let receipt = backend
            .process_payment(&payment(order.order_id, Decimal::new(210, 0)))
            .await?;

        assert!(receipt.success);
        assert!(
            receipt
                .transaction_id
                .as_deref()
                .is_some_and(|id| id.starts_with("TXN"))
        );
        assert_eq!(
            backend.order_status(order.order_id).await,
            Some(OrderStatus::Paid)
        );

        let again = backend
            .process_payment(&payment(order.order_id, Decimal::new(210, 0)))
            .await;

        assert!(matches!(again, Err(PaymentError::Declined(_))));

        Ok(())
    }

    #[tokio::test]
    async fn payment_declined_for_unknown_order_or_wrong_amount() -> TestResult {
        let backend = backend()?;
        let order = backend.submit_order(&request(&backend, &[(1, 1)])?).await?;

        let unknown = backend
            .process_payment(&payment(OrderId::new(404), Decimal::new(84, 0)))
            .await;

        assert!(matches!(unknown, Err(PaymentError::Declined(_))));

        let short = backend
            .process_payment(&payment(order.order_id, Decimal::new(8398, 2)))
            .await;

        assert!(matches!(short, Err(PaymentError::Declined(_))));
        assert_eq!(
            backend.order_status(order.order_id).await,
            Some(OrderStatus::Placed)
        );

        let close_enough = backend
            .process_payment(&payment(order.order_id, Decimal::new(8399, 2)))
            .await;

        assert!(close_enough.is_ok());

        Ok(())
    }
}
