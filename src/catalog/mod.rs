//! Catalog
//!
//! The menu as seen by the cart: an immutable snapshot of [`CatalogItem`]s,
//! refreshed on demand from a [`CatalogProvider`].

use std::fmt;

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::PricingError;

pub mod fixtures;

/// Errors raised while fetching or assembling a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog provider could not be reached or returned garbage.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// An item's currency differs from the catalog currency
    /// (item, item currency, catalog currency).
    #[error("Item {0} has currency {1}, but catalog has currency {2}")]
    CurrencyMismatch(MenuItemId, &'static str, &'static str),

    /// The same identifier appears twice in one snapshot.
    #[error("duplicate menu item {0}")]
    DuplicateItem(MenuItemId),

    /// Invalid price format
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// Money conversion error.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// YAML parsing error
    #[error("failed to parse menu fixture: {0}")]
    Fixture(#[from] serde_norway::Error),
}

/// Menu item identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MenuItemId(u32);

impl MenuItemId {
    /// Wrap a raw identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for MenuItemId {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for MenuItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Dietary category used by the menu filter.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    /// Vegetarian
    Veg,

    /// Non-vegetarian
    NonVeg,

    /// Anything the menu does not classify
    #[default]
    #[serde(other)]
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Veg => "veg",
            Category::NonVeg => "non-veg",
            Category::Other => "other",
        })
    }
}

/// A single orderable menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogItem {
    /// Stable identifier
    pub id: MenuItemId,

    /// Display name
    pub name: String,

    /// Short description shown under the name
    pub description: String,

    /// Unit price
    pub price: Money<'static, Currency>,

    /// Category tag
    pub category: Category,

    /// Whether the kitchen is currently serving it
    pub available: bool,
}

/// Read-only snapshot of the menu.
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    index: FxHashMap<MenuItemId, usize>,
    currency: &'static Currency,
}

impl Catalog {
    /// An empty snapshot, used before the first fetch.
    pub fn empty(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            index: FxHashMap::default(),
            currency,
        }
    }

    /// Build a snapshot from items in provider order.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::CurrencyMismatch`]: an item is priced in another currency.
    /// - [`CatalogError::DuplicateItem`]: two items share an identifier.
    pub fn new(
        currency: &'static Currency,
        items: impl Into<Vec<CatalogItem>>,
    ) -> Result<Self, CatalogError> {
        let items = items.into();
        let mut index = FxHashMap::default();

        for (position, item) in items.iter().enumerate() {
            let item_currency = item.price.currency();

            if item_currency != currency {
                return Err(CatalogError::CurrencyMismatch(
                    item.id,
                    item_currency.iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if index.insert(item.id, position).is_some() {
                return Err(CatalogError::DuplicateItem(item.id));
            }
        }

        Ok(Self {
            items,
            index,
            currency,
        })
    }

    /// Look up an item by identifier.
    pub fn get(&self, id: MenuItemId) -> Option<&CatalogItem> {
        self.index
            .get(&id)
            .and_then(|&position| self.items.get(position))
    }

    /// Whether the identifier resolves in this snapshot.
    pub fn contains(&self, id: MenuItemId) -> bool {
        self.index.contains_key(&id)
    }

    /// Items in provider order.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter()
    }

    /// Items currently being served.
    pub fn available(&self) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(|item| item.available)
    }

    /// Case-insensitive substring search over names and descriptions.
    ///
    /// A blank query matches every item.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a CatalogItem> + use<'a> {
        let needle = query.trim().to_lowercase();

        self.items.iter().filter(move |item| {
            needle.is_empty()
                || item.name.to_lowercase().contains(&needle)
                || item.description.to_lowercase().contains(&needle)
        })
    }

    /// Items in the given category, or every item when `category` is `None`.
    pub fn in_category(&self, category: Option<Category>) -> impl Iterator<Item = &CatalogItem> {
        self.items
            .iter()
            .filter(move |item| category.is_none_or(|wanted| item.category == wanted))
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Currency every price in the snapshot is expressed in.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}

/// Supplies catalog snapshots.
#[automock]
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch a fresh snapshot of the menu.
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError>;
}
