//! Cart operation failures.
//!
//! Business failures (out of stock, unknown line) are values, not panics.
//! Every failure maps to exactly one [`Notice`]; callers decide whether to
//! show it.

use rocket_shoes_core::ProductId;
use thiserror::Error;

use crate::inventory::InventoryError;
use crate::notify::Notice;
use crate::storage::StorageError;

/// Underlying cause of a failed operation.
#[derive(Debug, Error)]
pub enum Cause {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Failure of a cart operation. The cart is unchanged whenever one is returned.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock or catalog lookup failed, or the new cart could not be saved.
    #[error("failed to add product {id} to the cart")]
    AddFailed {
        id: ProductId,
        #[source]
        cause: Option<Cause>,
    },

    /// The product has no line, or the new cart could not be saved.
    #[error("failed to remove product {id} from the cart")]
    RemovalFailed {
        id: ProductId,
        #[source]
        cause: Option<Cause>,
    },

    /// The product has no line, stock could not be fetched, or the new cart
    /// could not be saved.
    #[error("failed to update the amount of product {id}")]
    UpdateFailed {
        id: ProductId,
        #[source]
        cause: Option<Cause>,
    },

    /// The requested quantity is not available.
    #[error("requested amount of product {id} is out of stock")]
    OutOfStock { id: ProductId },
}

impl CartError {
    /// The notification shown for this failure.
    #[must_use]
    pub const fn notice(&self) -> Notice {
        match self {
            Self::AddFailed { .. } => Notice::AddFailed,
            Self::RemovalFailed { .. } => Notice::RemovalFailed,
            Self::UpdateFailed { .. } => Notice::UpdateFailed,
            Self::OutOfStock { .. } => Notice::OutOfStock,
        }
    }

    /// Product the failed operation targeted.
    #[must_use]
    pub const fn product_id(&self) -> ProductId {
        match self {
            Self::AddFailed { id, .. }
            | Self::RemovalFailed { id, .. }
            | Self::UpdateFailed { id, .. }
            | Self::OutOfStock { id } => *id,
        }
    }
}

/// Result type alias for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;
