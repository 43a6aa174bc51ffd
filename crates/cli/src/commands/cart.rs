//! Cart commands.
//!
//! Each invocation opens the persisted cart, applies at most one operation
//! and reports the resulting cart. Operation failures are shown as
//! notifications and do not change the exit status.

use rocket_shoes_cart::{
    CartConfig, CartContext, CartStore, CartSummary, FileSlot, InventoryClient, InventoryError,
    StorageError, TracingNotifier,
};
use rocket_shoes_core::{Cart, CurrencyCode, ProductId};
use thiserror::Error;
use tracing::info;

/// Errors that stop a command before it reaches the cart.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Inventory client error: {0}")]
    Inventory(#[from] InventoryError),

    #[error("Could not open saved cart: {0}")]
    Storage(#[from] StorageError),
}

/// An opened cart plus the settings needed to render it.
pub struct Session {
    context: CartContext<InventoryClient, FileSlot, TracingNotifier>,
    currency: CurrencyCode,
}

impl Session {
    /// Open the cart described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the saved
    /// cart cannot be read.
    pub fn open(config: &CartConfig) -> Result<Self, CommandError> {
        let inventory = InventoryClient::new(&config.inventory)?;
        let slot = FileSlot::new(&config.storage.path);
        let store = CartStore::open(inventory, slot, config.storage.key.as_str())?;

        info!(
            api = %config.inventory.base_url,
            storage = %config.storage.path.display(),
            "Cart opened"
        );

        Ok(Self {
            context: CartContext::new(store, TracingNotifier),
            currency: config.currency,
        })
    }

    /// Show the cart.
    pub fn list(&self) {
        self.report(&self.context.cart());
    }

    /// Add one unit of a product and show the cart.
    pub async fn add(&self, id: ProductId) {
        let cart = self.context.add_product(id).await;
        self.report(&cart);
    }

    /// Remove a product and show the cart.
    pub async fn remove(&self, id: ProductId) {
        let cart = self.context.remove_product(id).await;
        self.report(&cart);
    }

    /// Set a product's quantity and show the cart.
    pub async fn update(&self, id: ProductId, amount: i64) {
        let cart = self.context.update_product_amount(id, amount).await;
        self.report(&cart);
    }

    fn report(&self, cart: &Cart) {
        for line in summary_lines(&CartSummary::new(cart, self.currency)) {
            info!("{line}");
        }
    }
}

/// Render a summary as report lines.
fn summary_lines(summary: &CartSummary) -> Vec<String> {
    if summary.is_empty() {
        return vec!["Cart is empty".to_string()];
    }

    let mut lines = Vec::with_capacity(summary.items.len() + 2);
    lines.push(format!(
        "Cart: {} product(s), {} item(s)",
        summary.size, summary.quantity
    ));
    for item in &summary.items {
        let price = item.price.as_deref().unwrap_or("-");
        lines.push(format!(
            "  [{}] {} x{} @ {price} = {}",
            item.id, item.title, item.amount, item.subtotal
        ));
    }
    lines.push(format!("Total: {}", summary.total));
    lines
}
