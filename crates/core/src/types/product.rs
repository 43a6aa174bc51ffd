//! Catalog and inventory records.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ProductId;

/// A catalog entry as returned by `GET products/{id}`.
///
/// Only `id` is required. The display fields the cart knows about are
/// optional, and any other field is kept in `extra` so a record survives
/// load and save unchanged. `price` travels as a bare JSON number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "rust_decimal::serde::float_option::serialize"
    )]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// A record with only an id and a title.
    #[must_use]
    pub fn new(id: ProductId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: Some(title.into()),
            price: None,
            image: None,
            extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_price(mut self, price: Decimal) -> Self {
        self.price = Some(price);
        self
    }

    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Title for display, empty if the record has none.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    /// Unit price, zero if the record has none.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }
}

/// Available quantity for a product, as returned by `GET stock/{id}`.
///
/// Fetched on demand and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stock {
    pub id: ProductId,
    pub amount: u32,
}
