//! Laceup Cart - client-side shopping cart state management.
//!
//! Tracks which products a shopper has selected and their quantities,
//! persists the selection across restarts, and validates quantities against
//! a remote stock source before mutating state.
//!
//! # Architecture
//!
//! [`CartStore`] owns the in-memory cart and exposes the three mutation
//! operations (add, remove, update-amount). Its collaborators are injected
//! as trait objects at construction:
//!
//! - [`StockService`] / [`ProductCatalog`] - remote lookups, implemented by
//!   [`ShopClient`] over the shop's REST API
//! - [`KeyValueStore`] - durable storage for the serialized cart, implemented
//!   by [`JsonFileStore`] (or [`MemoryStore`] for tests)
//! - [`NotificationSink`] - fire-and-forget user-facing error messages
//!
//! Control flow: caller triggers an operation, the store validates against
//! stock, mutates the in-memory list, writes the snapshot through the
//! key-value store, and returns the updated list for the caller to render.
//!
//! # Example
//!
//! ```rust,ignore
//! use laceup_cart::{CartConfig, CartStore, JsonFileStore, ShopClient, TracingSink};
//! use laceup_core::ProductId;
//! use std::sync::Arc;
//!
//! let config = CartConfig::from_env()?;
//! let client = ShopClient::new(&config.api)?;
//! let storage = Arc::new(JsonFileStore::open(&config.cart_file)?);
//!
//! let store = CartStore::load(
//!     Arc::new(client.clone()),
//!     Arc::new(client),
//!     storage,
//!     Arc::new(TracingSink),
//!     &config.storage_key,
//! );
//!
//! let cart = store.add_product(ProductId::new(1)).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod client;
pub mod config;
pub mod error;
pub mod notify;
pub mod ports;
pub mod storage;
pub mod store;
pub mod types;

pub use client::{ShopApiError, ShopClient};
pub use config::{CartConfig, ConfigError, ShopApiConfig};
pub use error::CartError;
pub use notify::{RecordingSink, TracingSink};
pub use ports::{BoxError, KeyValueStore, NotificationSink, ProductCatalog, StockService};
pub use storage::{JsonFileStore, MemoryStore, StorageError};
pub use store::{CartStore, DEFAULT_STORAGE_KEY};
pub use types::{CartItem, CatalogProduct, StockLevel};
