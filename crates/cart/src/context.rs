//! The handle UI code holds.
//!
//! [`CartContext`] wraps a [`CartStore`] and a [`Notifier`]. Its operations
//! never fail: a failure is logged, turned into its fixed notification, and
//! the caller gets back the (unchanged) current cart.

use std::sync::Arc;

use rocket_shoes_core::{Cart, ProductId};
use tokio::sync::watch;

use crate::error::CartError;
use crate::inventory::{Inventory, InventoryClient};
use crate::notify::{Notifier, TracingNotifier};
use crate::storage::{FileSlot, Slot};
use crate::store::{CartSnapshot, CartStore};

/// Cart state plus operations, with failures surfaced as notifications.
pub struct CartContext<I = InventoryClient, S = FileSlot, N = TracingNotifier> {
    store: CartStore<I, S>,
    notifier: Arc<N>,
}

impl<I, S, N> Clone for CartContext<I, S, N> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<I: Inventory + 'static, S: Slot + 'static, N: Notifier> CartContext<I, S, N> {
    #[must_use]
    pub fn new(store: CartStore<I, S>, notifier: N) -> Self {
        Self {
            store,
            notifier: Arc::new(notifier),
        }
    }

    /// The underlying store, for callers that want tagged results.
    #[must_use]
    pub const fn store(&self) -> &CartStore<I, S> {
        &self.store
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        self.store.cart()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.store.subscribe()
    }

    /// Add one unit of a product; see [`CartStore::add_product`].
    pub async fn add_product(&self, id: ProductId) -> Cart {
        let result = self.store.add_product(id).await;
        self.absorb(result)
    }

    /// Remove a product's line; see [`CartStore::remove_product`].
    pub async fn remove_product(&self, id: ProductId) -> Cart {
        let result = self.store.remove_product(id).await;
        self.absorb(result)
    }

    /// Set a product's quantity; see [`CartStore::update_product_amount`].
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) -> Cart {
        let result = self.store.update_product_amount(id, amount).await;
        self.absorb(result)
    }

    fn absorb(&self, result: Result<Cart, CartError>) -> Cart {
        match result {
            Ok(cart) => cart,
            Err(err) => {
                let notice = err.notice();
                match std::error::Error::source(&err) {
                    Some(cause) => tracing::warn!(
                        product_id = %err.product_id(),
                        error = %err,
                        cause = %cause,
                        "Cart operation failed"
                    ),
                    None => tracing::warn!(
                        product_id = %err.product_id(),
                        error = %err,
                        "Cart operation failed"
                    ),
                }
                self.notifier.error(notice.message());
                self.store.cart()
            }
        }
    }
}
