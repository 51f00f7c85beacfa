//! Cart Totals

use std::num::NonZeroU32;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    catalog::{Catalog, MenuItemId},
    pricing::money_to_decimal,
};

/// Tax rate applied to every cart unless one is configured.
pub fn default_tax_rate() -> Percentage {
    Percentage::from(0.05)
}

/// One priced cart line, ready for rendering or order serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    /// Item identifier
    pub item_id: MenuItemId,

    /// Display name from the catalog
    pub name: String,

    /// Unit price in major units
    pub unit_price: Decimal,

    /// Quantity in the cart
    pub quantity: NonZeroU32,

    /// `unit_price × quantity`
    pub line_total: Decimal,
}

/// Monetary totals derived from a cart and a catalog snapshot.
///
/// Every amount is exact; nothing is rounded until it is presented.
/// Amounts beyond the range of [`Decimal`] saturate at [`Decimal::MAX`].
#[derive(Debug, Clone, PartialEq)]
pub struct CartTotals {
    subtotal: Decimal,
    tax: Decimal,
    total: Decimal,
    tax_rate: Percentage,
    line_items: SmallVec<[LineItem; 8]>,
    currency: &'static Currency,
}

impl CartTotals {
    /// Totals of an empty cart.
    pub fn empty(currency: &'static Currency, tax_rate: Percentage) -> Self {
        Self {
            subtotal: Decimal::ZERO,
            tax: Decimal::ZERO,
            total: Decimal::ZERO,
            tax_rate,
            line_items: SmallVec::new(),
            currency,
        }
    }

    /// Price `lines` against `catalog`.
    ///
    /// Lines whose item is missing from the catalog are skipped. Line items
    /// are ordered by item identifier, so the result does not depend on the
    /// order the lines were added in.
    pub fn compute(
        lines: impl IntoIterator<Item = (MenuItemId, NonZeroU32)>,
        catalog: &Catalog,
        tax_rate: Percentage,
    ) -> Self {
        let mut line_items: SmallVec<[LineItem; 8]> = lines
            .into_iter()
            .filter_map(|(item_id, quantity)| {
                let Some(item) = catalog.get(item_id) else {
                    debug!(%item_id, "skipping cart line missing from catalog");

                    return None;
                };

                let unit_price = money_to_decimal(&item.price);

                Some(LineItem {
                    item_id,
                    name: item.name.clone(),
                    unit_price,
                    quantity,
                    line_total: unit_price.saturating_mul(Decimal::from(quantity.get())),
                })
            })
            .collect();

        line_items.sort_unstable_by_key(|line| line.item_id);

        let subtotal = line_items
            .iter()
            .fold(Decimal::ZERO, |sum, line| sum.saturating_add(line.line_total));

        let tax = subtotal.saturating_mul(tax_rate * Decimal::ONE);

        Self {
            subtotal,
            tax,
            total: subtotal.saturating_add(tax),
            tax_rate,
            line_items,
            currency: catalog.currency(),
        }
    }

    /// Sum of line totals.
    pub fn subtotal(&self) -> Decimal {
        self.subtotal
    }

    /// Tax on the subtotal.
    pub fn tax(&self) -> Decimal {
        self.tax
    }

    /// Subtotal plus tax.
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Rate the tax was charged at.
    pub fn tax_rate(&self) -> Percentage {
        self.tax_rate
    }

    /// Priced lines ordered by item identifier.
    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    /// Currency of every amount.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Whether no line could be priced.
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }
}
