//! User-facing failure notifications.
//!
//! The storefront shows a toast for every failed cart operation. Only four
//! messages exist; the sink receives the literal text with no severity or
//! payload.

use std::sync::Arc;

/// The fixed set of cart failure messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    AddFailed,
    RemovalFailed,
    UpdateFailed,
    OutOfStock,
}

impl Notice {
    /// Text shown to the shopper.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::AddFailed => "Erro na adição do produto",
            Self::RemovalFailed => "Erro na remoção do produto",
            Self::UpdateFailed => "Erro na alteração de quantidade do produto",
            Self::OutOfStock => "Quantidade solicitada fora de estoque",
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

/// Fire-and-forget sink for error messages.
pub trait Notifier: Send + Sync {
    fn error(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn error(&self, message: &str) {
        (**self).error(message);
    }
}

/// Forwards notifications to `tracing` at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(target: "rocket_shoes_cart::notify", "{message}");
    }
}
