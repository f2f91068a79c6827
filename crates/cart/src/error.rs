//! Cart operation errors.
//!
//! Every failed operation both notifies the user through the injected
//! [`crate::NotificationSink`] and returns one of these variants, so callers
//! can distinguish outcomes programmatically instead of relying on the
//! notification side channel. Persistence-write failures are the exception:
//! they are best-effort, logged, and never surfaced here.

use thiserror::Error;

use laceup_core::ProductId;

use crate::ports::BoxError;

/// Errors returned by the cart store operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// Stock lookup failed (network or unknown product).
    #[error("stock lookup failed: {0}")]
    Stock(#[source] BoxError),

    /// Catalog lookup failed (network or unknown product).
    #[error("catalog lookup failed: {0}")]
    Catalog(#[source] BoxError),

    /// The requested quantity exceeds the available stock.
    #[error("requested quantity is out of stock")]
    OutOfStock,

    /// The product is not in the cart (remove only).
    #[error("product {0} is not in the cart")]
    NotInCart(ProductId),
}
