//! Cart commands.
//!
//! Each command wires a [`CartStore`] from the environment configuration:
//! [`ShopClient`] for stock/catalog lookups, [`JsonFileStore`] for the
//! persisted cart, and [`TracingSink`] so user-facing notifications land in
//! the log output.

use std::sync::Arc;

use thiserror::Error;

use laceup_cart::{
    CartConfig, CartError, CartItem, CartStore, ConfigError, JsonFileStore, ShopApiError,
    ShopClient, StorageError, TracingSink,
};
use laceup_core::{CurrencyCode, ProductId};

/// Errors that can occur during cart commands.
#[derive(Debug, Error)]
pub enum CartCliError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cart file could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The HTTP client could not be constructed.
    #[error("Shop API error: {0}")]
    Api(#[from] ShopApiError),

    /// A cart operation was rejected.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),
}

/// Build a cart store from the environment configuration.
fn build_store() -> Result<CartStore, CartCliError> {
    let config = CartConfig::from_env()?;
    let client = ShopClient::new(&config.api)?;
    let storage = Arc::new(JsonFileStore::open(&config.cart_file)?);

    Ok(CartStore::load(
        Arc::new(client.clone()),
        Arc::new(client),
        storage,
        Arc::new(TracingSink),
        &config.storage_key,
    ))
}

/// Add one unit of a product to the cart.
pub async fn add(product_id: i64) -> Result<(), CartCliError> {
    let store = build_store()?;
    let cart = store.add_product(ProductId::new(product_id)).await?;
    print_cart(&cart);
    Ok(())
}

/// Remove a product from the cart entirely.
pub fn remove(product_id: i64) -> Result<(), CartCliError> {
    let store = build_store()?;
    let cart = store.remove_product(ProductId::new(product_id))?;
    print_cart(&cart);
    Ok(())
}

/// Set the quantity of a product already in the cart.
pub async fn update(product_id: i64, amount: i64) -> Result<(), CartCliError> {
    let store = build_store()?;
    let cart = store.update_amount(ProductId::new(product_id), amount).await?;
    print_cart(&cart);
    Ok(())
}

/// Print the cart.
pub fn show() -> Result<(), CartCliError> {
    let store = build_store()?;
    print_cart(&store.items());
    Ok(())
}

/// Empty the persisted cart by overwriting the store key.
///
/// Goes through storage directly rather than the store; removing entries
/// one by one would hit the network for no reason.
pub fn clear() -> Result<(), CartCliError> {
    let config = CartConfig::from_env()?;
    let storage = JsonFileStore::open(&config.cart_file)?;
    if let Err(e) = laceup_cart::KeyValueStore::set(&storage, &config.storage_key, "[]") {
        tracing::warn!(error = %e, "failed to clear persisted cart");
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_cart(items: &[CartItem]) {
    if items.is_empty() {
        println!("Cart is empty");
        return;
    }

    let mut subtotal = rust_decimal::Decimal::ZERO;
    for item in items {
        let line_total = item.price.amount() * rust_decimal::Decimal::from(item.amount);
        subtotal += line_total;
        println!(
            "{:>6}  {:<40} x{:<4} {:>10}",
            item.id,
            item.name,
            item.amount,
            laceup_core::Price::new(line_total).display(CurrencyCode::USD),
        );
    }
    println!(
        "{:>6}  {:<40} {:>16}",
        "",
        "Subtotal",
        laceup_core::Price::new(subtotal).display(CurrencyCode::USD),
    );
}
