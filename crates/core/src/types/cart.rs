//! The cart: an ordered list of product lines, unique by product id.
//!
//! Insertion order is display order. Every transition builds a new [`Cart`]
//! and leaves the receiver untouched, so a store can persist the new state
//! before publishing it.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::product::Product;

/// A product line in the cart.
///
/// Serialized flat: the product's fields (known or not) plus `amount`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    #[serde(flatten)]
    pub product: Product,
    /// Quantity in the cart, at least 1.
    pub amount: u32,
}

impl CartItem {
    /// Start a new line for a product with quantity 1.
    #[must_use]
    pub const fn new(product: Product) -> Self {
        Self { product, amount: 1 }
    }

    #[must_use]
    pub const fn id(&self) -> ProductId {
        self.product.id
    }

    /// Unit price times quantity; a line without a price counts as zero.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.unit_price() * Decimal::from(self.amount)
    }
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: ProductId) -> bool {
        self.get(id).is_some()
    }

    /// Number of distinct products (the header badge count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of all line quantities.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.amount)).sum()
    }

    /// Sum of all line subtotals.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.items.iter().map(CartItem::subtotal).sum()
    }

    /// Append a new line with quantity 1.
    ///
    /// Returns `None` if the product already has a line.
    #[must_use]
    pub fn with_new_item(&self, product: Product) -> Option<Self> {
        if self.contains(product.id) {
            return None;
        }

        let mut items = self.items.clone();
        items.push(CartItem::new(product));
        Some(Self { items })
    }

    /// Replace the quantity of an existing line, keeping its position.
    ///
    /// Returns `None` if the product has no line.
    #[must_use]
    pub fn with_amount(&self, id: ProductId, amount: u32) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let items = self
            .items
            .iter()
            .map(|item| {
                if item.id() == id {
                    CartItem {
                        product: item.product.clone(),
                        amount,
                    }
                } else {
                    item.clone()
                }
            })
            .collect();
        Some(Self { items })
    }

    /// Drop the line for a product, preserving the order of the rest.
    ///
    /// Returns `None` if the product has no line.
    #[must_use]
    pub fn without(&self, id: ProductId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }

        let items = self
            .items
            .iter()
            .filter(|item| item.id() != id)
            .cloned()
            .collect();
        Some(Self { items })
    }
}

impl From<Vec<CartItem>> for Cart {
    fn from(items: Vec<CartItem>) -> Self {
        Self { items }
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: i32, price_cents: i64) -> Product {
        Product::new(ProductId::new(id), format!("Shoe {id}"))
            .with_price(Decimal::new(price_cents, 2))
            .with_image(format!("https://example.com/{id}.jpg"))
    }

    fn cart_of(lines: &[(i32, u32)]) -> Cart {
        Cart::from(
            lines
                .iter()
                .map(|&(id, amount)| CartItem {
                    product: product(id, 1000),
                    amount,
                })
                .collect::<Vec<_>>(),
        )
    }

    fn ids(cart: &Cart) -> Vec<i32> {
        cart.iter().map(|item| item.id().as_i32()).collect()
    }

    #[test]
    fn test_with_new_item_appends_with_amount_one() {
        let cart = cart_of(&[(1, 2)]);
        let next = cart.with_new_item(product(2, 500)).unwrap();

        assert_eq!(ids(&next), vec![1, 2]);
        assert_eq!(next.get(ProductId::new(2)).unwrap().amount, 1);
        // Receiver is unchanged
        assert_eq!(ids(&cart), vec![1]);
    }

    #[test]
    fn test_with_new_item_rejects_duplicate() {
        let cart = cart_of(&[(1, 2)]);
        assert!(cart.with_new_item(product(1, 500)).is_none());
    }

    #[test]
    fn test_with_amount_only_touches_target_line() {
        let cart = cart_of(&[(1, 1), (2, 4), (3, 1)]);
        let next = cart.with_amount(ProductId::new(2), 7).unwrap();

        assert_eq!(ids(&next), vec![1, 2, 3]);
        let amounts: Vec<u32> = next.iter().map(|item| item.amount).collect();
        assert_eq!(amounts, vec![1, 7, 1]);
    }

    #[test]
    fn test_with_amount_missing_line() {
        assert!(cart_of(&[(1, 1)]).with_amount(ProductId::new(9), 2).is_none());
    }

    #[test]
    fn test_without_preserves_order() {
        let cart = cart_of(&[(1, 1), (2, 1), (3, 1)]);
        let next = cart.without(ProductId::new(2)).unwrap();
        assert_eq!(ids(&next), vec![1, 3]);
        assert!(cart.without(ProductId::new(4)).is_none());
    }

    #[test]
    fn test_totals() {
        let cart = Cart::from(vec![
            CartItem {
                product: product(1, 17990),
                amount: 2,
            },
            CartItem {
                product: product(2, 13990),
                amount: 1,
            },
        ]);

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.total_quantity(), 3);
        assert_eq!(cart.total(), Decimal::new(49970, 2));
        assert_eq!(cart.items().first().unwrap().subtotal(), Decimal::new(35980, 2));
    }

    #[test]
    fn test_serializes_as_flat_array() {
        let cart = cart_of(&[(2, 1)]);
        let value = serde_json::to_value(&cart).unwrap();

        let line = &value[0];
        assert_eq!(line["id"], 2);
        assert_eq!(line["title"], "Shoe 2");
        assert_eq!(line["amount"], 1);
        assert!(line.get("product").is_none());

        let back: Cart = serde_json::from_value(value).unwrap();
        assert_eq!(back, cart);
    }

    #[test]
    fn test_line_keeps_unknown_fields_through_transitions() {
        let raw = serde_json::json!([
            { "id": 1, "title": "A", "brand": "Nike", "amount": 1 },
            { "id": 2, "title": "B", "amount": 3 },
        ]);
        let cart: Cart = serde_json::from_value(raw).unwrap();

        let next = cart
            .with_amount(ProductId::new(1), 2)
            .and_then(|cart| cart.without(ProductId::new(2)))
            .unwrap();

        assert_eq!(
            serde_json::to_value(&next).unwrap(),
            serde_json::json!([{ "id": 1, "title": "A", "brand": "Nike", "amount": 2 }])
        );
    }

    #[test]
    fn test_line_without_price_counts_as_zero() {
        let cart = Cart::from(vec![
            CartItem {
                product: Product::new(ProductId::new(1), "No price"),
                amount: 4,
            },
            CartItem {
                product: product(2, 1000),
                amount: 1,
            },
        ]);

        assert_eq!(cart.total(), Decimal::new(1000, 2));
        assert_eq!(cart.total_quantity(), 5);
    }
}
