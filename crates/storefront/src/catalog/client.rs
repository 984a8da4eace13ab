//! Remote catalog provider client.
//!
//! Two endpoints: "list products by category" and "get product by
//! identifier". Success is a boolean status check - the provider defines
//! no richer error contract - and bodies pass through the provider
//! mapping boundary. Responses are cached for five minutes.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::{debug, instrument};
use url::Url;

use velour_core::{CategoryId, Product, ProductId};

use super::CatalogError;
use super::provider::{ProviderProduct, ProviderProductList, map_provider_product};
use crate::config::CatalogApiConfig;

/// Cached response values.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Listing(Arc<Vec<Product>>),
}

/// Client for the remote catalog provider API.
///
/// Cheaply cloneable; product and listing responses are cached for five
/// minutes.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<String, CacheValue>,
}

impl CatalogClient {
    /// Create a new provider client.
    #[must_use]
    pub fn new(config: &CatalogApiConfig) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogClientInner {
                client: reqwest::Client::new(),
                base_url: config.base_url.clone(),
                cache,
            }),
        }
    }

    /// Get a product by its identifier.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the provider answers 404,
    /// and a transport or status error otherwise.
    #[instrument(skip(self), fields(id = %id))]
    pub async fn product(&self, id: &ProductId) -> Result<Product, CatalogError> {
        let cache_key = format!("product:{id}");

        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let url = self.inner.base_url.join(&format!("products/{id}"))?;
        let response = self.inner.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound(format!("product {id}")));
        }
        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let record: ProviderProduct = response.json().await?;
        let product = map_provider_product(record);

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// List the products carrying a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the provider answers a
    /// non-success status.
    #[instrument(skip(self), fields(category = %category))]
    pub async fn products_by_category(
        &self,
        category: &CategoryId,
    ) -> Result<Vec<Product>, CatalogError> {
        let cache_key = format!("category:{category}");

        if let Some(CacheValue::Listing(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for category listing");
            return Ok(products.as_ref().clone());
        }

        let url = self
            .inner
            .base_url
            .join(&format!("products/by_category/{category}"))?;
        let response = self.inner.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(CatalogError::Status(response.status().as_u16()));
        }

        let listing: ProviderProductList = response.json().await?;
        let products: Vec<Product> = listing
            .products
            .into_iter()
            .map(map_provider_product)
            .collect();

        self.inner
            .cache
            .insert(cache_key, CacheValue::Listing(Arc::new(products.clone())))
            .await;

        Ok(products)
    }
}
