//! Canteen prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    backends::{HttpBackend, InMemoryBackend},
    cart::{
        AddOutcome, Cart, CartEvent, CartObserver, CartTotals, LineItem, NoopObserver,
        ValidationError, default_tax_rate,
    },
    catalog::{Catalog, CatalogError, CatalogItem, CatalogProvider, Category, MenuItemId},
    checkout::{CheckoutError, CheckoutFlow, CheckoutReceipt, CheckoutState},
    orders::{
        BuyerId, OrderConfirmation, OrderError, OrderId, OrderRequest, OrderStatus, OrderSubmitter,
    },
    payments::{PaymentError, PaymentMethod, PaymentProcessor, PaymentReceipt, PaymentRequest},
    receipt::{CartReceipt, ReceiptError},
    session::{Buyer, Collaborators, Notification, NotificationLevel, Session},
};
