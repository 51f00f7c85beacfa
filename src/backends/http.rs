//! HTTP backend for the canteen JSON API.

use std::{collections::BTreeMap, num::NonZeroU32};

use async_trait::async_trait;
use jiff::Timestamp;
use reqwest::Client;
use rust_decimal::Decimal;
use rusty_money::iso::Currency;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::{Catalog, CatalogError, CatalogItem, CatalogProvider, Category, MenuItemId},
    orders::{
        BuyerId, OrderConfirmation, OrderError, OrderId, OrderRequest, OrderStatus, OrderSubmitter,
    },
    payments::{PaymentError, PaymentMethod, PaymentProcessor, PaymentReceipt, PaymentRequest},
    pricing::decimal_to_money,
};

/// Transport failures talking to the canteen API.
#[derive(Debug, Error)]
pub enum HttpBackendError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-2xx response.
    #[error("unexpected response from canteen API: {0}")]
    UnexpectedResponse(String),
}

/// Client for the canteen JSON API.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    currency: &'static Currency,
    http: Client,
}

impl HttpBackend {
    /// Create a client for the API at `base_url`, reading prices in `currency`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, currency: &'static Currency) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            currency,
            http: Client::new(),
        }
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, HttpBackendError> {
        let url = format!("{}{path}", self.base_url);

        debug!(%url, "GET");

        let response = self.http.get(&url).send().await?;

        Self::parse(response, path).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, HttpBackendError> {
        let url = format!("{}{path}", self.base_url);

        debug!(%url, "POST");

        let response = self.http.post(&url).json(body).send().await?;

        Self::parse(response, path).await
    }

    async fn parse<T: DeserializeOwned>(
        response: reqwest::Response,
        path: &str,
    ) -> Result<T, HttpBackendError> {
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(HttpBackendError::UnexpectedResponse(format!(
                "{path} failed with status {status}: {text}"
            )));
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl CatalogProvider for HttpBackend {
    async fn fetch_catalog(&self) -> Result<Catalog, CatalogError> {
        let response: MenuResponse = self
            .get("/api/menu")
            .await
            .map_err(|err| CatalogError::Unavailable(err.to_string()))?;

        response.into_catalog(self.currency)
    }
}

#[async_trait]
impl OrderSubmitter for HttpBackend {
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, OrderError> {
        let body = OrderBody {
            user_id: order.buyer_id(),
            items: order.items(),
            time_slot: order.time_slot(),
        };

        let response: OrderResponse = self
            .post("/api/orders", &body)
            .await
            .map_err(|err| OrderError::Rejected(err.to_string()))?;

        response.into_confirmation(order.total())
    }
}

#[async_trait]
impl PaymentProcessor for HttpBackend {
    async fn process_payment(
        &self,
        payment: &PaymentRequest,
    ) -> Result<PaymentReceipt, PaymentError> {
        let body = PaymentBody {
            order_id: payment.order_id,
            amount: payment.amount,
            method: payment.method,
        };

        let response: PaymentResponse = self
            .post("/api/payment", &body)
            .await
            .map_err(|err| PaymentError::Declined(err.to_string()))?;

        response.into_receipt()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuResponse {
    success: bool,

    #[serde(default)]
    menu_items: Vec<MenuItemDto>,

    #[serde(default)]
    error: Option<String>,
}

impl MenuResponse {
    fn into_catalog(self, currency: &'static Currency) -> Result<Catalog, CatalogError> {
        if !self.success {
            return Err(CatalogError::Unavailable(
                self.error
                    .unwrap_or_else(|| "menu request was not successful".to_string()),
            ));
        }

        let items = self
            .menu_items
            .into_iter()
            .map(|dto| dto.into_item(currency))
            .collect::<Result<Vec<_>, _>>()?;

        Catalog::new(currency, items)
    }
}

#[derive(Debug, Deserialize)]
struct MenuItemDto {
    id: MenuItemId,
    name: String,

    #[serde(default)]
    description: String,

    #[serde(with = "rust_decimal::serde::float")]
    price: Decimal,

    #[serde(default)]
    category: Category,

    #[serde(default = "crate::catalog::fixtures::available_by_default")]
    available: bool,
}

impl MenuItemDto {
    fn into_item(self, currency: &'static Currency) -> Result<CatalogItem, CatalogError> {
        Ok(CatalogItem {
            id: self.id,
            name: self.name,
            description: self.description,
            price: decimal_to_money(self.price, currency)?,
            category: self.category,
            available: self.available,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OrderBody<'a> {
    user_id: BuyerId,
    items: &'a BTreeMap<MenuItemId, NonZeroU32>,
    time_slot: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderResponse {
    success: bool,

    #[serde(default)]
    order_id: Option<OrderId>,

    #[serde(default)]
    status: Option<OrderStatus>,

    #[serde(default, with = "rust_decimal::serde::float_option")]
    total_amount: Option<Decimal>,

    #[serde(default)]
    error: Option<String>,
}

impl OrderResponse {
    fn into_confirmation(self, requested_total: Decimal) -> Result<OrderConfirmation, OrderError> {
        let order_id = match (self.success, self.order_id) {
            (true, Some(order_id)) => order_id,
            (true, None) => {
                return Err(OrderError::Rejected(
                    "order accepted without an order id".to_string(),
                ));
            }
            (false, _) => {
                return Err(OrderError::Rejected(
                    self.error
                        .unwrap_or_else(|| "order was not accepted".to_string()),
                ));
            }
        };

        Ok(OrderConfirmation {
            order_id,
            status: self.status.unwrap_or(OrderStatus::Placed),
            total_amount: self.total_amount.unwrap_or(requested_total),
            placed_at: Timestamp::now(),
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentBody {
    order_id: OrderId,

    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,

    method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentResponse {
    success: bool,

    #[serde(default)]
    transaction_id: Option<String>,

    #[serde(default)]
    error: Option<String>,
}

impl PaymentResponse {
    fn into_receipt(self) -> Result<PaymentReceipt, PaymentError> {
        match (self.success, self.error) {
            (false, Some(error)) => Err(PaymentError::Declined(error)),
            (success, _) => Ok(PaymentReceipt {
                success,
                transaction_id: self.transaction_id,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use serde_json::json;
    use testresult::TestResult;

    use crate::{cart::Cart, catalog::tests::item};

    use super::*;

    #[test]
    fn new_trims_trailing_slash() {
        let backend = HttpBackend::new("http://localhost:8080/", iso::INR);

        assert_eq!(backend.base_url(), "http://localhost:8080");
    }

    #[test]
    fn menu_response_builds_catalog() -> TestResult {
        let response: MenuResponse = serde_json::from_value(json!({
            "success": true,
            "menuItems": [
                { "id": 1, "name": "Veg Thali", "description": "Rice, dal", "price": 80.0 },
                { "id": 4, "name": "Chicken Biryani", "price": 120.5, "category": "non-veg", "available": false }
            ]
        }))?;

        let catalog = response.into_catalog(iso::INR)?;
        let thali = catalog.get(MenuItemId::new(1)).ok_or("missing thali")?;
        let biryani = catalog.get(MenuItemId::new(4)).ok_or("missing biryani")?;

        assert_eq!(catalog.len(), 2);
        assert_eq!(thali.category, Category::Other);
        assert!(thali.available);
        assert_eq!(biryani.price, Money::from_minor(120_50, iso::INR));
        assert_eq!(biryani.category, Category::NonVeg);
        assert!(!biryani.available);

        Ok(())
    }

    #[test]
    fn unsuccessful_menu_response_is_unavailable() -> TestResult {
        let response: MenuResponse =
            serde_json::from_value(json!({ "success": false, "error": "database down" }))?;

        let result = response.into_catalog(iso::INR);

        assert!(
            matches!(&result, Err(CatalogError::Unavailable(reason)) if reason == "database down"),
            "expected Unavailable, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn order_body_uses_api_field_names() -> TestResult {
        let catalog = Catalog::new(iso::INR, [item(1, "Veg Thali", 80_00)])?;
        let mut cart = Cart::new();

        cart.set_quantity(MenuItemId::new(1), 2);

        let order = cart.to_order_payload(BuyerId::new(3), "12:30-12:45", &catalog)?;

        let body = OrderBody {
            user_id: order.buyer_id(),
            items: order.items(),
            time_slot: order.time_slot(),
        };

        assert_eq!(
            serde_json::to_value(&body)?,
            json!({ "userId": 3, "items": { "1": 2 }, "timeSlot": "12:30-12:45" })
        );

        Ok(())
    }

    #[test]
    fn order_response_without_success_is_rejected() -> TestResult {
        let response: OrderResponse =
            serde_json::from_value(json!({ "success": false, "error": "kitchen closed" }))?;

        assert_eq!(
            response.into_confirmation(Decimal::ONE),
            Err(OrderError::Rejected("kitchen closed".to_string()))
        );

        Ok(())
    }

    #[test]
    fn order_response_defaults_status_and_total() -> TestResult {
        let response: OrderResponse =
            serde_json::from_value(json!({ "success": true, "orderId": 12 }))?;

        let confirmation = response.into_confirmation(Decimal::new(210, 0))?;

        assert_eq!(confirmation.order_id, OrderId::new(12));
        assert_eq!(confirmation.status, OrderStatus::Placed);
        assert_eq!(confirmation.total_amount, Decimal::new(210, 0));

        Ok(())
    }

    #[test]
    fn payment_body_uses_api_field_names() -> TestResult {
        let body = PaymentBody {
            order_id: OrderId::new(12),
            amount: Decimal::new(21_050, 2),
            method: PaymentMethod::Upi,
        };

        assert_eq!(
            serde_json::to_value(&body)?,
            json!({ "orderId": 12, "amount": 210.5, "method": "UPI" })
        );

        Ok(())
    }

    #[test]
    fn payment_response_maps_to_receipt_or_decline() -> TestResult {
        let approved: PaymentResponse =
            serde_json::from_value(json!({ "success": true, "transactionId": "TXN42" }))?;

        assert_eq!(approved.into_receipt()?, PaymentReceipt::approved("TXN42"));

        let declined: PaymentResponse =
            serde_json::from_value(json!({ "success": false, "error": "amount mismatch" }))?;

        assert_eq!(
            declined.into_receipt(),
            Err(PaymentError::Declined("amount mismatch".to_string()))
        );

        Ok(())
    }
}
