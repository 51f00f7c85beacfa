//! Receipt

use std::io;

use decimal_percentage::Percentage;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use tabled::{
    builder::Builder,
    grid::config::HorizontalLine,
    settings::{
        Alignment, Color, Style, Theme,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::CartTotals,
    pricing::{PricingError, decimal_to_money},
};

/// Errors that can occur when rendering a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// An amount could not be expressed in minor units.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// IO error
    #[error("IO error")]
    IO,
}

/// One rendered cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    /// Item name
    pub name: String,

    /// Price of one unit
    pub unit_price: Money<'static, Currency>,

    /// Quantity ordered
    pub quantity: u32,

    /// Price of the whole line
    pub line_total: Money<'static, Currency>,
}

/// Cart totals rounded to the currency's minor unit for display.
#[derive(Debug, Clone)]
pub struct CartReceipt {
    lines: SmallVec<[ReceiptLine; 8]>,
    subtotal: Money<'static, Currency>,
    tax: Money<'static, Currency>,
    total: Money<'static, Currency>,
    tax_rate: Percentage,
}

impl CartReceipt {
    /// Round `totals` for display.
    ///
    /// # Errors
    ///
    /// Returns an error if an amount does not fit in minor units.
    pub fn from_totals(totals: &CartTotals) -> Result<Self, ReceiptError> {
        let currency = totals.currency();

        let lines = totals
            .line_items()
            .iter()
            .map(|line| {
                Ok(ReceiptLine {
                    name: line.name.clone(),
                    unit_price: decimal_to_money(line.unit_price, currency)?,
                    quantity: line.quantity.get(),
                    line_total: decimal_to_money(line.line_total, currency)?,
                })
            })
            .collect::<Result<SmallVec<_>, PricingError>>()?;

        Ok(Self {
            lines,
            subtotal: decimal_to_money(totals.subtotal(), currency)?,
            tax: decimal_to_money(totals.tax(), currency)?,
            total: decimal_to_money(totals.total(), currency)?,
            tax_rate: totals.tax_rate(),
        })
    }

    /// Rendered lines, ordered by item identifier.
    pub fn lines(&self) -> &[ReceiptLine] {
        &self.lines
    }

    /// Subtotal
    pub fn subtotal(&self) -> Money<'static, Currency> {
        self.subtotal
    }

    /// Tax
    pub fn tax(&self) -> Money<'static, Currency> {
        self.tax
    }

    /// Total
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Write the receipt as a table followed by the summary lines.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiptError::IO`] if writing to `out` fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), ReceiptError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Unit Price", "Qty", "Total"]);

        for line in &self.lines {
            builder.push_record([
                line.name.clone(),
                line.unit_price.to_string(),
                line.quantity.to_string(),
                line.line_total.to_string(),
            ]);
        }

        let mut table = builder.build();
        let mut theme = Theme::from(Style::modern_rounded());

        theme.remove_horizontal_lines();
        theme.insert_horizontal_line(
            1,
            HorizontalLine::new(Some('─'), Some('┼'), Some('├'), Some('┤')),
        );

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Columns::new(1..4), Alignment::right());

        writeln!(out, "\n{table}").map_err(|_err| ReceiptError::IO)?;

        let tax_label = format!("Tax ({}%):", percent_points(self.tax_rate));

        let summary = [
            ("Subtotal:", self.subtotal.to_string()),
            (tax_label.as_str(), self.tax.to_string()),
            ("Total:", self.total.to_string()),
        ];

        let label_width = summary.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
        let value_width = summary.iter().map(|(_, value)| value.len()).max().unwrap_or(0);

        for (label, value) in &summary {
            writeln!(out, " {label:<label_width$} {value:>value_width$}")
                .map_err(|_err| ReceiptError::IO)?;
        }

        Ok(())
    }
}

/// Converts a fractional percentage to percent points for display.
fn percent_points(percentage: Percentage) -> Decimal {
    (percentage * Decimal::ONE_HUNDRED).round_dp(2)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::{
        cart::{Cart, default_tax_rate},
        catalog::{Catalog, MenuItemId, tests::item},
    };

    use super::*;

    fn receipt_at(
        lines: &[(u32, i64)],
        catalog: &Catalog,
        tax_rate: Percentage,
    ) -> TestResult<CartReceipt> {
        let mut cart = Cart::new().with_tax_rate(tax_rate);

        for &(id, quantity) in lines {
            cart.set_quantity(MenuItemId::new(id), quantity);
        }

        Ok(CartReceipt::from_totals(&cart.compute_totals(catalog))?)
    }

    fn receipt(lines: &[(u32, i64)], catalog: &Catalog) -> TestResult<CartReceipt> {
        receipt_at(lines, catalog, default_tax_rate())
    }

    #[test]
    fn from_totals_converts_amounts_to_money() -> TestResult {
        let catalog = Catalog::new(
            iso::INR,
            [item(1, "Veg Thali", 80_00), item(2, "Chapati & Curry", 40_00)],
        )?;

        let receipt = receipt(&[(1, 2), (2, 1)], &catalog)?;

        assert_eq!(receipt.subtotal(), Money::from_minor(200_00, iso::INR));
        assert_eq!(receipt.tax(), Money::from_minor(10_00, iso::INR));
        assert_eq!(receipt.total(), Money::from_minor(210_00, iso::INR));
        assert_eq!(receipt.lines().len(), 2);

        Ok(())
    }

    #[test]
    fn from_totals_rounds_half_away_from_zero() -> TestResult {
        // 0.10 * 5% = 0.005, shown as 0.01
        let catalog = Catalog::new(iso::INR, [item(1, "Chai", 10)])?;

        let receipt = receipt(&[(1, 1)], &catalog)?;

        assert_eq!(receipt.tax(), Money::from_minor(1, iso::INR));
        assert_eq!(receipt.total(), Money::from_minor(11, iso::INR));

        Ok(())
    }

    #[test]
    fn write_to_renders_lines_and_summary() -> TestResult {
        let catalog = Catalog::new(
            iso::INR,
            [item(1, "Veg Thali", 80_00), item(2, "Chapati & Curry", 40_00)],
        )?;

        let receipt = receipt(&[(1, 2), (2, 1)], &catalog)?;
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert!(rendered.contains("Veg Thali"));
        assert!(rendered.contains("Chapati & Curry"));
        assert!(rendered.contains("Subtotal:"));
        assert!(rendered.contains("Tax (5.00%):"));
        assert!(rendered.contains("Total:"));

        Ok(())
    }

    #[test]
    fn write_to_labels_tax_with_the_rate_it_was_charged_at() -> TestResult {
        let catalog = Catalog::new(iso::INR, [item(1, "Veg Thali", 80_00)])?;

        let receipt = receipt_at(&[(1, 1)], &catalog, Percentage::from(0.18))?;
        let mut out = Vec::new();

        receipt.write_to(&mut out)?;

        let rendered = String::from_utf8(out)?;

        assert_eq!(receipt.tax(), Money::from_minor(14_40, iso::INR));
        assert!(rendered.contains("Tax (18.00%):"), "{rendered}");

        Ok(())
    }

    #[test]
    fn percent_points_scales_fraction() {
        assert_eq!(percent_points(Percentage::from(0.05)), Decimal::new(500, 2));
    }
}
