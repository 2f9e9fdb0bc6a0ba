//! Category endpoints, cached like the product listings.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::models::Category;

use super::{ApiClient, ApiError};

const CACHE_KEY: &str = "categories";
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Client for `/categories` endpoints.
#[derive(Clone)]
pub struct CategoryApi {
    client: ApiClient,
    cache: Cache<String, Arc<Vec<Category>>>,
}

impl CategoryApi {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        let cache = Cache::builder()
            .max_capacity(8)
            .time_to_live(CACHE_TTL)
            .build();
        Self { client, cache }
    }

    /// List all active categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Arc<Vec<Category>>, ApiError> {
        if let Some(categories) = self.cache.get(CACHE_KEY).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let value = self.client.get_value("categories").await?;
        let list = match value {
            Value::Array(_) => value,
            Value::Object(mut map) => map
                .remove("categories")
                .unwrap_or(Value::Array(Vec::new())),
            _ => Value::Array(Vec::new()),
        };

        let categories: Arc<Vec<Category>> = Arc::new(serde_json::from_value(list)?);
        self.cache
            .insert(CACHE_KEY.to_string(), Arc::clone(&categories))
            .await;
        Ok(categories)
    }

    /// Fetch one category by id or slug.
    ///
    /// # Errors
    ///
    /// Returns an error if the category does not exist or the request
    /// fails.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn get(&self, key: &str) -> Result<Category, ApiError> {
        let value = self.client.get_value(&format!("categories/{key}")).await?;
        let category = value.get("category").cloned().unwrap_or(value);
        Ok(serde_json::from_value(category)?)
    }
}

impl std::fmt::Debug for CategoryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryApi").finish_non_exhaustive()
    }
}
