//! Domain types for the cart.
//!
//! Field names serialize in camelCase (`imageUrl`) because the persisted
//! cart and the shop API both use that shape, and the persisted format has
//! no version field or migration scheme.

use serde::{Deserialize, Serialize};

use laceup_core::{Price, ProductId};

/// A product entry in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product identity; unique within the cart.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
    /// Quantity in the cart; always positive.
    pub amount: u32,
}

/// Product metadata as served by the catalog, without a cart quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    /// Product identity.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Unit price.
    pub price: Price,
    /// Product image URL.
    pub image_url: String,
}

impl CatalogProduct {
    /// Turn catalog metadata into a cart entry with the given quantity.
    #[must_use]
    pub fn into_cart_item(self, amount: u32) -> CartItem {
        CartItem {
            id: self.id,
            name: self.name,
            price: self.price,
            image_url: self.image_url,
            amount,
        }
    }
}

/// Available stock for a product, as reported by the stock service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLevel {
    /// Product identity.
    pub id: ProductId,
    /// Total available units; zero means sold out.
    pub amount: u32,
}
