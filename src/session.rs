//! Session
//!
//! Owns everything one buyer interacts with: the catalog snapshot, the cart
//! and the checkout flow. Collaborator failures are turned into
//! [`Notification`]s for the presentation layer instead of being returned.

use std::{fmt, sync::Arc};

use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    cart::{AddOutcome, Cart, CartObserver, CartTotals, NoopObserver},
    catalog::{Catalog, CatalogProvider, MenuItemId},
    checkout::{CheckoutError, CheckoutFlow, CheckoutReceipt, CheckoutState},
    orders::{BuyerId, OrderSubmitter},
    payments::{PaymentMethod, PaymentProcessor},
};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Something worked
    Success,

    /// Neutral information
    Info,

    /// The buyer needs to correct something
    Warning,

    /// A collaborator failed
    Error,
}

impl fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NotificationLevel::Success => "success",
            NotificationLevel::Info => "info",
            NotificationLevel::Warning => "warning",
            NotificationLevel::Error => "error",
        })
    }
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,

    /// Message text
    pub message: String,
}

impl Notification {
    /// Create a notification.
    pub fn new(level: NotificationLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    /// A success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Success, message)
    }

    /// An informational notification.
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Info, message)
    }

    /// A warning notification.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Warning, message)
    }

    /// An error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NotificationLevel::Error, message)
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// A signed-in buyer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buyer {
    /// Buyer identifier
    pub id: BuyerId,

    /// Display name
    pub name: String,
}

/// The external services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    /// Menu source
    pub catalog: Arc<dyn CatalogProvider>,

    /// Order acceptance
    pub orders: Arc<dyn OrderSubmitter>,

    /// Payment taking
    pub payments: Arc<dyn PaymentProcessor>,
}

impl Collaborators {
    /// Use one backend for every collaborator.
    pub fn shared<B>(backend: Arc<B>) -> Self
    where
        B: CatalogProvider + OrderSubmitter + PaymentProcessor + 'static,
    {
        Self {
            catalog: backend.clone(),
            orders: backend.clone(),
            payments: backend,
        }
    }
}

impl fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

/// One buyer's ordering session.
pub struct Session<O: CartObserver = NoopObserver> {
    provider: Arc<dyn CatalogProvider>,
    checkout: CheckoutFlow,
    catalog: Catalog,
    cart: Cart<O>,
    buyer: Option<Buyer>,
    placed: Vec<CheckoutReceipt>,
}

impl<O: CartObserver + fmt::Debug> fmt::Debug for Session<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("checkout", &self.checkout)
            .field("catalog", &self.catalog)
            .field("cart", &self.cart)
            .field("buyer", &self.buyer)
            .field("placed", &self.placed)
            .finish_non_exhaustive()
    }
}

impl<O: CartObserver> Session<O> {
    /// Start a signed-out session with an empty catalog snapshot.
    pub fn new(
        collaborators: Collaborators,
        cart: Cart<O>,
        method: PaymentMethod,
        currency: &'static Currency,
    ) -> Self {
        Self {
            provider: collaborators.catalog,
            checkout: CheckoutFlow::new(collaborators.orders, collaborators.payments, method),
            catalog: Catalog::empty(currency),
            cart,
            buyer: None,
            placed: Vec::new(),
        }
    }

    /// Replace the catalog snapshot with a fresh one.
    ///
    /// On failure the previous snapshot is kept.
    pub async fn refresh_catalog(&mut self) -> Notification {
        match self.provider.fetch_catalog().await {
            Ok(catalog) => {
                info!(items = catalog.len(), "catalog refreshed");

                let loaded = Notification::info(format!("Loaded {} menu items", catalog.len()));

                self.catalog = catalog;

                loaded
            }
            Err(err) => {
                error!(error = %err, "catalog refresh failed");

                Notification::error("Failed to load menu")
            }
        }
    }

    /// Sign a buyer in.
    pub fn sign_in(&mut self, buyer: Buyer) -> Notification {
        info!(buyer_id = %buyer.id, "buyer signed in");

        self.buyer = Some(buyer);

        Notification::success("Login successful!")
    }

    /// Sign the current buyer out, emptying the cart.
    pub fn sign_out(&mut self) -> Notification {
        if let Some(buyer) = self.buyer.take() {
            info!(buyer_id = %buyer.id, "buyer signed out");
        }

        self.cart.clear();

        Notification::success("Logged out successfully")
    }

    /// Put an item in the cart. Requires a signed-in buyer.
    pub fn add_to_cart(&mut self, item_id: MenuItemId) -> Notification {
        if self.buyer.is_none() {
            return Notification::warning("Please login to add items to cart");
        }

        match self.cart.add(item_id) {
            AddOutcome::Added => Notification::success("Item added to cart"),
            AddOutcome::Updated => Notification::success("Item updated in cart"),
        }
    }

    /// Remove an item's line from the cart.
    pub fn remove_from_cart(&mut self, item_id: MenuItemId) -> Notification {
        self.cart.remove(item_id);

        Notification::success("Item removed from cart")
    }

    /// Check out the cart for pickup in `time_slot`.
    pub async fn checkout(&mut self, time_slot: &str) -> Notification {
        let Some(buyer_id) = self.buyer.as_ref().map(|buyer| buyer.id) else {
            return Notification::warning("Please login to place order");
        };

        match self
            .checkout
            .run(&mut self.cart, &self.catalog, buyer_id, time_slot)
            .await
        {
            Ok(receipt) => {
                info!(
                    order_id = %receipt.confirmation.order_id,
                    %buyer_id,
                    "order placed"
                );

                self.placed.push(receipt);

                Notification::success("Order placed successfully!")
            }
            Err(CheckoutError::Validation(err)) => Notification::warning(err.to_string()),
            Err(err) => {
                error!(%buyer_id, error = %err, "checkout failed");

                Notification::error(format!("Failed to place order: {err}"))
            }
        }
    }

    /// The signed-in buyer, if any.
    pub fn buyer(&self) -> Option<&Buyer> {
        self.buyer.as_ref()
    }

    /// The cart.
    pub fn cart(&self) -> &Cart<O> {
        &self.cart
    }

    /// The cart, for quantity edits by the presentation layer.
    pub fn cart_mut(&mut self) -> &mut Cart<O> {
        &mut self.cart
    }

    /// The current catalog snapshot.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Cart totals against the current catalog snapshot.
    pub fn totals(&self) -> CartTotals {
        self.cart.compute_totals(&self.catalog)
    }

    /// State of the most recent checkout.
    pub fn checkout_state(&self) -> &CheckoutState {
        self.checkout.state()
    }

    /// Receipts of every order placed in this session.
    pub fn placed_orders(&self) -> &[CheckoutReceipt] {
        &self.placed
    }
}
