//! Display data for the cart page and header badge.

use rocket_shoes_core::{Cart, CartItem, CurrencyCode, Price, ProductId};
use serde::Serialize;

/// Cart line display data.
///
/// `price` is `None` for records without one; such lines add nothing to the
/// total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartItemSummary {
    pub id: ProductId,
    pub title: String,
    pub image: Option<String>,
    pub amount: u32,
    pub price: Option<String>,
    pub subtotal: String,
}

/// Cart display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub items: Vec<CartItemSummary>,
    pub total: String,
    /// Distinct products, as shown in the header.
    pub size: usize,
    /// Sum of all quantities.
    pub quantity: u64,
}

impl CartSummary {
    /// Render a cart's prices in `currency`.
    #[must_use]
    pub fn new(cart: &Cart, currency: CurrencyCode) -> Self {
        Self {
            items: cart
                .iter()
                .map(|item| CartItemSummary::new(item, currency))
                .collect(),
            total: Price::new(cart.total(), currency).display(),
            size: cart.len(),
            quantity: cart.total_quantity(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl CartItemSummary {
    fn new(item: &CartItem, currency: CurrencyCode) -> Self {
        Self {
            id: item.id(),
            title: item.product.title().to_string(),
            image: item.product.image.clone(),
            amount: item.amount,
            price: item
                .product
                .price
                .map(|price| Price::new(price, currency).display()),
            subtotal: Price::new(item.subtotal(), currency).display(),
        }
    }
}
