//! The cart store.
//!
//! Owns the current [`Cart`], validates quantities against the inventory
//! service and mirrors every successful mutation to a persistent [`Slot`].
//!
//! # Concurrency
//!
//! Mutations are serialized by a single-writer lock held for the whole
//! operation, network calls included, so each operation starts from the
//! cart the previous one published. Two rapid `add_product` calls on the
//! same line always compose to +2. Readers never wait on the writer: they
//! see the last published snapshot through a `watch` channel.
//!
//! # Persistence
//!
//! The slot is written before the new cart is published. If the write
//! fails, the operation fails and the in-memory cart is left as it was.
//! Writes run on tokio's blocking pool; the single read in
//! [`CartStore::open`] happens on the caller's thread.

use std::sync::Arc;

use rocket_shoes_core::{Cart, ProductId};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument};

use crate::error::{CartError, Result};
use crate::inventory::{Inventory, InventoryClient};
use crate::storage::{FileSlot, Slot, StorageError};

/// A published cart together with its version.
///
/// The version starts at 0 when the store is opened and increases by one
/// with every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartSnapshot {
    pub cart: Cart,
    pub version: u64,
}

/// Shared handle to the cart state.
///
/// Cheap to clone; clones operate on the same cart.
pub struct CartStore<I = InventoryClient, S = FileSlot> {
    inner: Arc<CartStoreInner<I, S>>,
}

impl<I, S> Clone for CartStore<I, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CartStoreInner<I, S> {
    inventory: I,
    slot: S,
    key: String,
    writer: Mutex<()>,
    published: watch::Sender<CartSnapshot>,
}

impl<I: Inventory + 'static, S: Slot + 'static> CartStore<I, S> {
    /// Open the store, loading the cart saved under `key`.
    ///
    /// An absent or empty slot yields an empty cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Parse` if the saved cart is malformed, or
    /// another `StorageError` if the slot cannot be read. Malformed content
    /// is never silently replaced.
    pub fn open(
        inventory: I,
        slot: S,
        key: impl Into<String>,
    ) -> std::result::Result<Self, StorageError> {
        let key = key.into();

        let cart = match slot.get(&key)? {
            Some(raw) if !raw.trim().is_empty() => {
                serde_json::from_str::<Cart>(&raw).map_err(StorageError::Parse)?
            }
            _ => Cart::new(),
        };

        debug!(key = %key, lines = cart.len(), "Loaded cart from slot");

        let (published, _) = watch::channel(CartSnapshot { cart, version: 0 });

        Ok(Self {
            inner: Arc::new(CartStoreInner {
                inventory,
                slot,
                key,
                writer: Mutex::new(()),
                published,
            }),
        })
    }

    /// The current cart.
    #[must_use]
    pub fn cart(&self) -> Cart {
        self.inner.published.borrow().cart.clone()
    }

    /// The current cart and its version.
    #[must_use]
    pub fn snapshot(&self) -> CartSnapshot {
        self.inner.published.borrow().clone()
    }

    /// Watch for newly published carts.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CartSnapshot> {
        self.inner.published.subscribe()
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Add one unit of a product.
    ///
    /// Stock is fetched first. A product already in the cart is incremented
    /// unless its quantity has reached the available stock. A new product is
    /// looked up in the catalog and appended with quantity 1; its stock level
    /// is not compared on this first insertion.
    ///
    /// # Errors
    ///
    /// - `CartError::AddFailed` if stock or catalog lookup fails, or the
    ///   new cart cannot be saved
    /// - `CartError::OutOfStock` if the line already holds all available stock
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn add_product(&self, id: ProductId) -> Result<Cart> {
        let _writer = self.inner.writer.lock().await;
        let cart = self.cart();

        let stock = self
            .inner
            .inventory
            .stock(id)
            .await
            .map_err(|e| CartError::AddFailed {
                id,
                cause: Some(e.into()),
            })?;

        let next = match cart.get(id) {
            Some(item) => {
                if item.amount >= stock.amount {
                    return Err(CartError::OutOfStock { id });
                }
                cart.with_amount(id, item.amount + 1)
            }
            None => {
                let product =
                    self.inner
                        .inventory
                        .product(id)
                        .await
                        .map_err(|e| CartError::AddFailed {
                            id,
                            cause: Some(e.into()),
                        })?;
                cart.with_new_item(product)
            }
        };

        // `None` here means the catalog answered with a different product id
        // that is already in the cart.
        let next = next.ok_or(CartError::AddFailed { id, cause: None })?;

        self.commit(next).await.map_err(|e| CartError::AddFailed {
            id,
            cause: Some(e.into()),
        })
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// `CartError::RemovalFailed` if the product has no line or the new cart
    /// cannot be saved.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn remove_product(&self, id: ProductId) -> Result<Cart> {
        let _writer = self.inner.writer.lock().await;

        let next = self
            .cart()
            .without(id)
            .ok_or(CartError::RemovalFailed { id, cause: None })?;

        self.commit(next).await.map_err(|e| CartError::RemovalFailed {
            id,
            cause: Some(e.into()),
        })
    }

    /// Set a product's quantity to exactly `amount`.
    ///
    /// `amount` is signed so that out-of-range input from the UI reaches the
    /// stock check instead of failing to parse.
    ///
    /// # Errors
    ///
    /// - `CartError::UpdateFailed` if the product has no line, stock cannot
    ///   be fetched, or the new cart cannot be saved
    /// - `CartError::OutOfStock` if the stock record is unavailable,
    ///   `amount < 1`, or `amount` exceeds the available stock
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn update_product_amount(&self, id: ProductId, amount: i64) -> Result<Cart> {
        let _writer = self.inner.writer.lock().await;
        let cart = self.cart();

        if !cart.contains(id) {
            return Err(CartError::UpdateFailed { id, cause: None });
        }

        let stock = match self.inner.inventory.stock(id).await {
            Ok(stock) => stock,
            Err(e) if e.is_not_found() => return Err(CartError::OutOfStock { id }),
            Err(e) => {
                return Err(CartError::UpdateFailed {
                    id,
                    cause: Some(e.into()),
                });
            }
        };

        let amount = u32::try_from(amount)
            .ok()
            .filter(|n| (1..=stock.amount).contains(n))
            .ok_or(CartError::OutOfStock { id })?;

        let next = cart
            .with_amount(id, amount)
            .ok_or(CartError::UpdateFailed { id, cause: None })?;

        self.commit(next).await.map_err(|e| CartError::UpdateFailed {
            id,
            cause: Some(e.into()),
        })
    }

    /// Persist `next`, then publish it. Caller must hold the writer lock.
    async fn commit(&self, next: Cart) -> std::result::Result<Cart, StorageError> {
        let raw = serde_json::to_string(&next).map_err(StorageError::Serialize)?;

        // Slot writes are blocking I/O; keep them off the async workers
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || inner.slot.set(&inner.key, &raw))
            .await
            .map_err(|e| StorageError::Io(std::io::Error::other(e)))??;

        let mut version = 0;
        self.inner.published.send_modify(|snapshot| {
            snapshot.cart = next.clone();
            snapshot.version += 1;
            version = snapshot.version;
        });

        info!(version, lines = next.len(), "Cart updated");
        Ok(next)
    }
}
