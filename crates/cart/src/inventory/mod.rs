//! Inventory API access.
//!
//! # Architecture
//!
//! - The inventory service is the source of truth for stock; stock is read
//!   on every operation that needs it and never cached
//! - Catalog records rarely change, so [`InventoryClient`] keeps them in a
//!   `moka` cache (5 minute TTL)
//! - The store depends on the [`Inventory`] trait, not on the HTTP client,
//!   so tests and alternate backends can stand in for the service
//!
//! # Endpoints
//!
//! - `GET stock/{id}` - `{ "id": 1, "amount": 3 }`
//! - `GET products/{id}` - `{ "id": 1, "title": "...", "price": 179.9, "image": "..." }`

mod client;

pub use client::InventoryClient;

use std::future::Future;

use rocket_shoes_core::{Product, ProductId, Stock};
use thiserror::Error;

/// Errors that can occur when talking to the inventory service.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// HTTP request failed (connection, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The service has no record for the requested resource.
    #[error("Not found: {0}")]
    NotFound(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Endpoint URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Client could not be configured.
    #[error("Client configuration error: {0}")]
    Config(String),
}

impl InventoryError {
    /// Whether the service answered but had no data for the product.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Source of stock levels and catalog records.
pub trait Inventory: Send + Sync {
    /// Current available quantity for a product.
    fn stock(&self, id: ProductId) -> impl Future<Output = Result<Stock, InventoryError>> + Send;

    /// Catalog record for a product.
    fn product(&self, id: ProductId)
    -> impl Future<Output = Result<Product, InventoryError>> + Send;
}

impl<T: Inventory> Inventory for std::sync::Arc<T> {
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        (**self).stock(id).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        (**self).product(id).await
    }
}
