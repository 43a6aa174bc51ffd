//! RocketShoes cart library.
//!
//! Client-side shopping-cart state: add products, remove products and
//! adjust quantities, validated against the inventory API and persisted to
//! a local key-value slot.
//!
//! # Architecture
//!
//! - [`store::CartStore`] owns the cart and returns tagged results
//! - [`context::CartContext`] is the handle UI code holds; it turns
//!   failures into one of four fixed notifications
//! - [`inventory::Inventory`], [`storage::Slot`] and [`notify::Notifier`] are
//!   the seams to the outside world
//!
//! # Example
//!
//! ```rust,ignore
//! use rocket_shoes_cart::{CartConfig, CartContext, CartStore, FileSlot, InventoryClient, TracingNotifier};
//!
//! let config = CartConfig::from_env()?;
//! let inventory = InventoryClient::new(&config.inventory)?;
//! let slot = FileSlot::new(&config.storage.path);
//! let store = CartStore::open(inventory, slot, &config.storage.key)?;
//! let cart = CartContext::new(store, TracingNotifier);
//!
//! cart.add_product(ProductId::new(1)).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod context;
pub mod error;
pub mod inventory;
pub mod notify;
pub mod storage;
pub mod store;
pub mod summary;

pub use config::{CartConfig, ConfigError};
pub use context::CartContext;
pub use error::CartError;
pub use inventory::{Inventory, InventoryClient, InventoryError};
pub use notify::{Notice, Notifier, TracingNotifier};
pub use storage::{FileSlot, MemorySlot, Slot, StorageError};
pub use store::{CartSnapshot, CartStore};
pub use summary::CartSummary;
