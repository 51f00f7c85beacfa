//! Menu Fixtures

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;

use crate::{
    catalog::{Catalog, CatalogError, CatalogItem, Category, MenuItemId},
    pricing::{decimal_to_money, parse_currency},
};

/// The canteen's default menu, bundled with the crate.
pub const DEFAULT_MENU: &str = include_str!("../../fixtures/menu.yml");

/// Wrapper for a menu in YAML
#[derive(Debug, Deserialize)]
pub struct MenuFixture {
    /// Currency code every price must use
    pub currency: String,

    /// Menu items in display order
    pub items: Vec<MenuItemFixture>,
}

/// Menu Item Fixture
#[derive(Debug, Deserialize)]
pub struct MenuItemFixture {
    /// Item identifier
    pub id: u32,

    /// Item name
    pub name: String,

    /// Item description
    #[serde(default)]
    pub description: String,

    /// Item price (e.g., "80.00 INR")
    pub price: String,

    /// Item category, unclassified when omitted
    #[serde(default)]
    pub category: Category,

    /// Item availability, available when omitted
    #[serde(default = "available_by_default")]
    pub available: bool,
}

pub(crate) fn available_by_default() -> bool {
    true
}

impl TryFrom<MenuItemFixture> for CatalogItem {
    type Error = CatalogError;

    fn try_from(fixture: MenuItemFixture) -> Result<Self, Self::Error> {
        Ok(CatalogItem {
            id: MenuItemId::new(fixture.id),
            name: fixture.name,
            description: fixture.description,
            price: parse_price(&fixture.price)?,
            category: fixture.category,
            available: fixture.available,
        })
    }
}

impl Catalog {
    /// Parse a catalog from a YAML menu fixture.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is malformed, a price cannot be parsed,
    /// or the items disagree with the declared currency.
    pub fn from_yaml(contents: &str) -> Result<Self, CatalogError> {
        let fixture: MenuFixture = serde_norway::from_str(contents)?;
        let currency = parse_currency(&fixture.currency)?;

        let items = fixture
            .items
            .into_iter()
            .map(CatalogItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Catalog::new(currency, items)
    }

    /// The bundled default menu.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled fixture is invalid.
    pub fn default_menu() -> Result<Self, CatalogError> {
        Self::from_yaml(DEFAULT_MENU)
    }
}

/// Parse price string (e.g., "80.00 INR") into money
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is not a non-negative decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, CatalogError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(CatalogError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| CatalogError::InvalidPrice(s.to_string()))?;

    let currency = parse_currency(code)?;

    Ok(decimal_to_money(amount, currency)?)
}
