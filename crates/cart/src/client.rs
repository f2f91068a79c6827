//! Shop API client implementation.
//!
//! Talks to the shop's REST API (`/products/{id}`, `/stock/{id}`) with
//! `reqwest` and implements the [`StockService`] and [`ProductCatalog`]
//! ports. Catalog responses are cached using `moka` (5-minute TTL); stock
//! is never cached, since validation needs the current level.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use laceup_core::ProductId;

use crate::config::ShopApiConfig;
use crate::ports::{BoxError, ProductCatalog, StockService};
use crate::types::{CatalogProduct, StockLevel};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Errors that can occur when talking to the shop API.
#[derive(Debug, Error)]
pub enum ShopApiError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status.
    #[error("unexpected status {status} for {path}")]
    Status { status: u16, path: String },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Client for the shop's stock and catalog endpoints.
#[derive(Clone)]
pub struct ShopClient {
    inner: Arc<ShopClientInner>,
}

struct ShopClientInner {
    client: reqwest::Client,
    base_url: String,
    catalog_cache: Cache<i64, CatalogProduct>,
}

impl ShopClient {
    /// Create a new shop API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopApiError::Http` if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &ShopApiConfig) -> Result<Self, ShopApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        Ok(Self {
            inner: Arc::new(ShopClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                catalog_cache,
            }),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Execute a GET request and decode the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ShopApiError> {
        let response = self.inner.client.get(self.endpoint(path)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ShopApiError::NotFound(path.to_string()));
        }

        // Body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                path,
                body = %body.chars().take(200).collect::<String>(),
                "shop API returned non-success status"
            );
            return Err(ShopApiError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(200).collect::<String>(),
                "failed to parse shop API response"
            );
            ShopApiError::Parse(e)
        })
    }

    /// Fetch the stock level for a product. Never cached.
    ///
    /// # Errors
    ///
    /// Returns `ShopApiError::NotFound` for an unknown product, or a
    /// transport/parse error.
    #[instrument(skip(self))]
    pub async fn stock(&self, product_id: ProductId) -> Result<StockLevel, ShopApiError> {
        self.get_json(&format!("stock/{product_id}")).await
    }

    /// Fetch catalog metadata for a product, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns `ShopApiError::NotFound` for an unknown product, or a
    /// transport/parse error.
    #[instrument(skip(self))]
    pub async fn catalog_product(
        &self,
        product_id: ProductId,
    ) -> Result<CatalogProduct, ShopApiError> {
        if let Some(product) = self.inner.catalog_cache.get(&product_id.as_i64()).await {
            debug!(%product_id, "catalog cache hit");
            return Ok(product);
        }

        let product: CatalogProduct = self.get_json(&format!("products/{product_id}")).await?;
        self.inner
            .catalog_cache
            .insert(product_id.as_i64(), product.clone())
            .await;
        Ok(product)
    }
}

#[async_trait]
impl StockService for ShopClient {
    async fn stock_level(&self, product_id: ProductId) -> Result<StockLevel, BoxError> {
        Ok(self.stock(product_id).await?)
    }
}

#[async_trait]
impl ProductCatalog for ShopClient {
    async fn product(&self, product_id: ProductId) -> Result<CatalogProduct, BoxError> {
        Ok(self.catalog_product(product_id).await?)
    }
}
