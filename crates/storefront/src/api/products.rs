//! Product catalog endpoints.
//!
//! Listings and product detail are cached in-memory for 5 minutes via
//! `moka`. Search queries bypass the cache.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::models::{Product, ProductPage};

use super::{ApiClient, ApiError};

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Page(Arc<ProductPage>),
}

/// Query parameters for the product list endpoint.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl ProductQuery {
    fn cache_key(&self) -> String {
        format!(
            "products:{}:{}:{}:{}:{}:{}",
            self.category_id.as_deref().unwrap_or(""),
            self.min_price.as_deref().unwrap_or(""),
            self.max_price.as_deref().unwrap_or(""),
            self.sort_by.as_deref().unwrap_or(""),
            self.sort_order.as_deref().unwrap_or(""),
            self.page.unwrap_or(1),
        )
    }
}

/// Client for `/products` endpoints.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct ProductApi {
    client: ApiClient,
    cache: Cache<String, CacheValue>,
}

impl ProductApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache }
    }

    /// Get a paginated, filtered product listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self, query: &ProductQuery) -> Result<Arc<ProductPage>, ApiError> {
        let cache_key = query.cache_key();

        if query.search.is_none()
            && let Some(CacheValue::Page(page)) = self.cache.get(&cache_key).await
        {
            debug!("cache hit for product listing");
            return Ok(page);
        }

        let value: Value = self.client.get_with_query("products", query).await?;

        // Older deployments return a bare array instead of the page object.
        let page: ProductPage = if value.is_array() {
            ProductPage {
                products: serde_json::from_value(value)?,
                pagination: None,
            }
        } else {
            serde_json::from_value(value)?
        };

        let page = Arc::new(page);
        if query.search.is_none() {
            self.cache
                .insert(cache_key, CacheValue::Page(Arc::clone(&page)))
                .await;
        }

        Ok(page)
    }

    /// Get one product by id or slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the product does not exist or the request fails.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get(&self, key: &str) -> Result<Product, ApiError> {
        let cache_key = format!("product:{key}");

        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let value = self.client.get_value(&format!("products/{key}")).await?;
        let product = value.get("product").cloned().unwrap_or(value);
        let product: Product = serde_json::from_value(product)?;

        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get the featured product strip for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Arc<ProductPage>, ApiError> {
        let query = ProductQuery {
            sort_by: Some("created_at".to_string()),
            sort_order: Some("desc".to_string()),
            limit: Some(8),
            ..ProductQuery::default()
        };
        self.list(&query).await
    }
}

impl std::fmt::Debug for ProductApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductApi").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_query_serializes_camel_case() {
        let query = ProductQuery {
            category_id: Some("c-1".to_string()),
            max_price: Some("5000".to_string()),
            page: Some(2),
            ..ProductQuery::default()
        };
        let value = serde_json::to_value(&query).expect("serialize");
        assert_eq!(value["categoryId"], "c-1");
        assert_eq!(value["maxPrice"], "5000");
        assert!(value.get("search").is_none());
    }

    #[test]
    fn test_cache_key_ignores_search() {
        let plain = ProductQuery::default();
        let searching = ProductQuery {
            search: Some("cement".to_string()),
            ..ProductQuery::default()
        };
        assert_eq!(plain.cache_key(), searching.cache_key());
    }
}
