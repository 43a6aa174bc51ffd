//! HTTP client for the inventory API.
//!
//! Uses `reqwest` for HTTP and caches catalog records using `moka`
//! (5-minute TTL). Stock responses are never cached.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rocket_shoes_core::{Product, ProductId, Stock};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Inventory, InventoryError};
use crate::config::InventoryConfig;

/// Client for the inventory API.
///
/// Cheap to clone; clones share the connection pool and catalog cache.
#[derive(Clone)]
pub struct InventoryClient {
    inner: Arc<InventoryClientInner>,
}

struct InventoryClientInner {
    client: reqwest::Client,
    base_url: Url,
    catalog: Cache<ProductId, Product>,
}

impl InventoryClient {
    /// Create a new inventory API client.
    ///
    /// # Errors
    ///
    /// Returns error if the API token is not a valid header value or the
    /// HTTP client fails to build.
    pub fn new(config: &InventoryConfig) -> Result<Self, InventoryError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| InventoryError::Config(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        let catalog = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(InventoryClientInner {
                client,
                base_url: config.base_url.clone(),
                catalog,
            }),
        })
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop every cached catalog record.
    pub fn invalidate_catalog(&self) {
        self.inner.catalog.invalidate_all();
    }

    /// Fetch and decode `GET {base}/{resource}/{id}`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: ProductId,
    ) -> Result<T, InventoryError> {
        let path = format!("{resource}/{id}");
        let url = self.inner.base_url.join(&path)?;

        let response = self.inner.client.get(url).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(InventoryError::NotFound(path));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "Inventory API returned non-success status"
            );
            return Err(InventoryError::Api {
                status: status.as_u16(),
                message: response_text.chars().take(200).collect(),
            });
        }

        let body = response_text.trim();
        if body.is_empty() {
            return Err(InventoryError::NotFound(path));
        }

        match serde_json::from_str::<Option<T>>(body) {
            Ok(Some(value)) => Ok(value),
            Ok(None) => Err(InventoryError::NotFound(path)),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %body.chars().take(500).collect::<String>(),
                    "Failed to parse inventory API response"
                );
                Err(InventoryError::Parse(e))
            }
        }
    }
}

impl Inventory for InventoryClient {
    #[instrument(skip(self), fields(product_id = %id))]
    async fn stock(&self, id: ProductId) -> Result<Stock, InventoryError> {
        let stock: Stock = self.get_json("stock", id).await?;
        debug!(available = stock.amount, "Fetched stock");
        Ok(stock)
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn product(&self, id: ProductId) -> Result<Product, InventoryError> {
        if let Some(product) = self.inner.catalog.get(&id).await {
            debug!("Catalog cache hit");
            return Ok(product);
        }

        let product: Product = self.get_json("products", id).await?;
        self.inner.catalog.insert(id, product.clone()).await;
        Ok(product)
    }
}
