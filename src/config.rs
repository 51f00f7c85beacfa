//! Client configuration

use std::sync::Arc;

use clap::{Args, ValueEnum};
use decimal_percentage::Percentage;
use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    backends::{HttpBackend, InMemoryBackend},
    catalog::{Catalog, CatalogError},
    payments::PaymentMethod,
    pricing::parse_currency,
    session::Collaborators,
};

/// Errors parsing configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Tax rate was not a non-negative percentage or fraction
    #[error("invalid tax rate: {0}")]
    InvalidTaxRate(String),
}

/// Which collaborators to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// The canteen JSON API
    Http,

    /// The bundled menu with orders kept in memory
    Memory,
}

/// Canteen client configuration
#[derive(Debug, Clone, Args)]
pub struct ClientConfig {
    /// Canteen API base URL
    #[arg(long, env = "CANTEEN_API_URL", default_value = "http://localhost:8080")]
    pub api_url: String,

    /// Backend to order from
    #[arg(long, env = "CANTEEN_BACKEND", value_enum, default_value = "memory")]
    pub backend: BackendKind,

    /// Menu currency (ISO 4217 code)
    #[arg(long, env = "CANTEEN_CURRENCY", default_value = "INR", value_parser = parse_currency)]
    pub currency: &'static Currency,

    /// Tax rate applied to the cart subtotal (e.g. "5%" or "0.05")
    #[arg(long, env = "CANTEEN_TAX_RATE", default_value = "5%", value_parser = parse_tax_rate)]
    pub tax_rate: Percentage,

    /// Payment method used at checkout
    #[arg(long, env = "CANTEEN_PAYMENT_METHOD", value_enum, default_value = "upi")]
    pub payment_method: PaymentMethod,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl ClientConfig {
    /// Build the configured collaborators.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled menu cannot be loaded for the
    /// in-memory backend.
    pub fn collaborators(&self) -> Result<Collaborators, CatalogError> {
        Ok(match self.backend {
            BackendKind::Http => {
                Collaborators::shared(Arc::new(HttpBackend::new(&self.api_url, self.currency)))
            }
            BackendKind::Memory => Collaborators::shared(Arc::new(InMemoryBackend::new(
                Catalog::default_menu()?,
                self.tax_rate,
            ))),
        })
    }
}

/// Parse a tax rate given as a percentage ("5%") or a fraction ("0.05").
///
/// # Errors
///
/// Returns an error if the value is not a number or is negative.
pub fn parse_tax_rate(s: &str) -> Result<Percentage, ConfigError> {
    let trimmed = s.trim();

    let fraction = if let Some(percent) = trimmed.strip_suffix('%') {
        percent
            .trim()
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidTaxRate(s.to_string()))?
            / 100.0
    } else {
        trimmed
            .parse::<f64>()
            .map_err(|_err| ConfigError::InvalidTaxRate(s.to_string()))?
    };

    if !fraction.is_finite() || fraction < 0.0 {
        return Err(ConfigError::InvalidTaxRate(s.to_string()));
    }

    Ok(Percentage::from(fraction))
}
