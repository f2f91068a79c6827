//! Collaborator traits for the cart store.
//!
//! The store never talks to the network or the filesystem directly; it is
//! handed these four ports at construction. Implementations in this crate:
//! [`crate::ShopClient`] for the two lookup ports, [`crate::JsonFileStore`]
//! and [`crate::MemoryStore`] for storage, [`crate::TracingSink`] and
//! [`crate::RecordingSink`] for notifications.

use async_trait::async_trait;

use laceup_core::ProductId;

use crate::types::{CatalogProduct, StockLevel};

/// Boxed error type used at the port boundaries.
///
/// Ports are object-safe so the store can hold them as `Arc<dyn _>`;
/// implementations box their concrete error types on the way out.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Read-only lookup of available stock for a product.
#[async_trait]
pub trait StockService: Send + Sync {
    /// Fetch the current stock level for a product.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the product is unknown.
    async fn stock_level(&self, product_id: ProductId) -> Result<StockLevel, BoxError>;
}

/// Read-only lookup of product metadata.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// Fetch catalog metadata for a product.
    ///
    /// # Errors
    ///
    /// Returns an error on network failure or if the product is unknown.
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, BoxError>;
}

/// String-keyed durable storage surviving process restarts.
///
/// Methods take `&self`, so implementations use interior mutability for
/// thread-safe access.
pub trait KeyValueStore: Send + Sync {
    /// Retrieve a value by key.
    ///
    /// Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, BoxError>;

    /// Insert or update a value.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying storage cannot be written. Callers
    /// in this crate treat writes as best-effort and swallow the error.
    fn set(&self, key: &str, value: &str) -> Result<(), BoxError>;
}

/// Fire-and-forget user-facing error messages.
///
/// No return value and no delivery guarantee; the toast surface of a
/// browser front end maps here.
pub trait NotificationSink: Send + Sync {
    /// Report an error message to the user.
    fn error(&self, message: &str);
}
