//! Cart
//!
//! The cart ledger: a mapping from menu item to requested quantity. A stored
//! quantity is always positive; a line whose quantity would reach zero is
//! removed instead. Totals are derived on demand against a catalog snapshot.

use std::{collections::BTreeMap, num::NonZeroU32};

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, MenuItemId},
    orders::{BuyerId, OrderRequest},
};

pub mod observer;
pub mod totals;

pub use observer::{CartEvent, CartObserver, NoopObserver};
pub use totals::{CartTotals, LineItem, default_tax_rate};

/// Preconditions checked before an order payload can be built.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The cart has no lines.
    #[error("Your cart is empty")]
    EmptyCart,

    /// No pickup or delivery slot was chosen.
    #[error("Please select a time slot")]
    MissingTimeSlot,
}

/// Result of [`Cart::add`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added,

    /// The item was already in the cart; its quantity was kept.
    Updated,
}

/// Cart ledger
#[derive(Debug, Clone)]
pub struct Cart<O: CartObserver = NoopObserver> {
    lines: FxHashMap<MenuItemId, NonZeroU32>,
    tax_rate: Percentage,
    observer: O,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: CartObserver> Cart<O> {
    /// Create an empty cart that reports changes to `observer`.
    pub fn with_observer(observer: O) -> Self {
        Self {
            lines: FxHashMap::default(),
            tax_rate: default_tax_rate(),
            observer,
        }
    }

    /// Use a tax rate other than the default 5%.
    #[must_use]
    pub fn with_tax_rate(mut self, tax_rate: Percentage) -> Self {
        self.tax_rate = tax_rate;
        self
    }

    /// Replace the quantity of a line.
    ///
    /// A quantity of zero or less removes the line. The item does not need to
    /// exist in any catalog.
    pub fn set_quantity(&mut self, item_id: MenuItemId, quantity: i64) {
        let quantity = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

        match NonZeroU32::new(quantity) {
            Some(quantity) => self.store(item_id, quantity),
            None => self.remove(item_id),
        }
    }

    /// Add one to a line, creating it if absent.
    pub fn increment(&mut self, item_id: MenuItemId) {
        let next = self
            .lines
            .get(&item_id)
            .map_or(NonZeroU32::MIN, |quantity| quantity.saturating_add(1));

        self.store(item_id, next);
    }

    /// Take one from a line, removing it when it would reach zero.
    ///
    /// Decrementing an absent line does nothing.
    pub fn decrement(&mut self, item_id: MenuItemId) {
        let Some(&current) = self.lines.get(&item_id) else {
            return;
        };

        match NonZeroU32::new(current.get() - 1) {
            Some(quantity) => self.store(item_id, quantity),
            None => self.remove(item_id),
        }
    }

    /// Put an item in the cart the way the menu's add button does.
    ///
    /// An absent item gets a line with quantity 1. An item already in the
    /// cart keeps its current quantity.
    pub fn add(&mut self, item_id: MenuItemId) -> AddOutcome {
        if self.lines.contains_key(&item_id) {
            AddOutcome::Updated
        } else {
            self.store(item_id, NonZeroU32::MIN);

            AddOutcome::Added
        }
    }

    /// Delete a line if present.
    pub fn remove(&mut self, item_id: MenuItemId) {
        if self.lines.remove(&item_id).is_some() {
            debug!(%item_id, "cart line removed");

            self.observer.on_change(CartEvent::LineRemoved { item_id });
        }
    }

    /// Delete every line.
    pub fn clear(&mut self) {
        if self.lines.is_empty() {
            return;
        }

        self.lines.clear();

        debug!("cart cleared");

        self.observer.on_change(CartEvent::Cleared);
    }

    /// Quantity of a line, zero when absent.
    pub fn quantity(&self, item_id: MenuItemId) -> u32 {
        self.lines.get(&item_id).map_or(0, |quantity| quantity.get())
    }

    /// Whether the item has a line.
    pub fn contains(&self, item_id: MenuItemId) -> bool {
        self.lines.contains_key(&item_id)
    }

    /// Lines in no particular order.
    pub fn lines(&self) -> impl Iterator<Item = (MenuItemId, NonZeroU32)> + '_ {
        self.lines
            .iter()
            .map(|(&item_id, &quantity)| (item_id, quantity))
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Sum of every line's quantity.
    pub fn total_quantity(&self) -> u64 {
        self.lines
            .values()
            .map(|quantity| u64::from(quantity.get()))
            .sum()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Tax rate applied by [`Cart::compute_totals`].
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// The observer receiving change notifications.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Price the cart against a catalog snapshot.
    ///
    /// Lines for items missing from the snapshot are left out of the totals.
    pub fn compute_totals(&self, catalog: &Catalog) -> CartTotals {
        CartTotals::compute(self.lines(), catalog, self.tax_rate)
    }

    /// Snapshot the cart into an order request.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::EmptyCart`]: the cart has no lines. Checked first.
    /// - [`ValidationError::MissingTimeSlot`]: `time_slot` is blank.
    pub fn to_order_payload(
        &self,
        buyer_id: BuyerId,
        time_slot: &str,
        catalog: &Catalog,
    ) -> Result<OrderRequest, ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::EmptyCart);
        }

        if time_slot.trim().is_empty() {
            return Err(ValidationError::MissingTimeSlot);
        }

        let items: BTreeMap<_, _> = self.lines().collect();

        Ok(OrderRequest::new(
            buyer_id,
            items,
            time_slot.to_string(),
            self.compute_totals(catalog),
        ))
    }

    fn store(&mut self, item_id: MenuItemId, quantity: NonZeroU32) {
        if self.lines.insert(item_id, quantity) == Some(quantity) {
            return;
        }

        debug!(%item_id, quantity = quantity.get(), "cart line changed");

        self.observer
            .on_change(CartEvent::LineChanged { item_id, quantity });
    }
}
