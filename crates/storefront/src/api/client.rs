//! QKart REST API client implementation.
//!
//! Uses `reqwest` for HTTP with JSON bodies and bearer-token auth.
//! Caches the product catalog using `moka` (TTL from configuration).

use std::sync::Arc;

use moka::future::Cache;
use qkart_core::{Address, AddressId, CartRecord, Password, Product, Username};
use reqwest::StatusCode;
use serde::de::{DeserializeOwned, IgnoredAny};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{AddressRequest, CheckoutRequest, CredentialsRequest, ErrorBody, LoginResponse};
use super::{ApiError, CartApi};
use crate::config::ApiConfig;
use crate::models::AuthToken;

/// Maximum number of response body characters written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the QKart REST API.
///
/// Cheap to clone; all clones share one connection pool and one cache.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    endpoint: String,
    cache: Cache<CacheKey, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;

        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    /// Base endpoint this client talks to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.endpoint)
    }

    /// Send a request and decode a JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        // Read as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.message);

            if status == StatusCode::NOT_FOUND {
                debug!(status = %status, message = ?message, "QKart API returned not found");
            } else {
                tracing::warn!(
                    status = %status,
                    message = ?message,
                    body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                    "QKart API returned non-success status"
                );
            }

            return Err(ApiError::Status { status, message });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(LOG_BODY_LIMIT).collect::<String>(),
                "Failed to parse QKart API response"
            );
            ApiError::Decode(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// Get the full product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        if let Some(CacheValue::Catalog(products)) = self.inner.cache.get(&CacheKey::Catalog).await
        {
            debug!("Cache hit for catalog");
            return Ok(products);
        }

        let products: Arc<Vec<Product>> = Arc::new(
            self.execute(self.inner.client.get(self.url("/products")))
                .await?,
        );

        debug!(count = products.len(), "Fetched catalog");

        self.inner
            .cache
            .insert(CacheKey::Catalog, CacheValue::Catalog(Arc::clone(&products)))
            .await;

        Ok(products)
    }

    /// Search the catalog by name or category.
    ///
    /// The backend answers 404 when nothing matches; callers treat that as an
    /// empty result rather than a failure.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, value: &str) -> Result<Vec<Product>, ApiError> {
        self.execute(
            self.inner
                .client
                .get(self.url("/products/search"))
                .query(&[("value", value)]),
        )
        .await
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails (e.g. the username is taken).
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(&self, username: &Username, password: &Password) -> Result<(), ApiError> {
        let body = CredentialsRequest {
            username: username.as_str(),
            password: password.expose(),
        };
        let _: IgnoredAny = self
            .execute(self.inner.client.post(self.url("/auth/register")).json(&body))
            .await?;
        Ok(())
    }

    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn login(
        &self,
        username: &Username,
        password: &Password,
    ) -> Result<LoginResponse, ApiError> {
        let body = CredentialsRequest {
            username: username.as_str(),
            password: password.expose(),
        };
        self.execute(self.inner.client.post(self.url("/auth/login")).json(&body))
            .await
    }

    // =========================================================================
    // Address Methods
    // =========================================================================

    /// List the user's saved addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_addresses(&self, token: &AuthToken) -> Result<Vec<Address>, ApiError> {
        self.execute(
            self.inner
                .client
                .get(self.url("/user/addresses"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    /// Add an address and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address))]
    pub async fn add_address(
        &self,
        token: &AuthToken,
        address: &str,
    ) -> Result<Vec<Address>, ApiError> {
        self.execute(
            self.inner
                .client
                .post(self.url("/user/addresses"))
                .bearer_auth(token.expose())
                .json(&AddressRequest { address }),
        )
        .await
    }

    /// Delete an address and return the updated list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(address_id = %id))]
    pub async fn delete_address(
        &self,
        token: &AuthToken,
        id: &AddressId,
    ) -> Result<Vec<Address>, ApiError> {
        self.execute(
            self.inner
                .client
                .delete(self.url(&format!("/user/addresses/{id}")))
                .bearer_auth(token.expose()),
        )
        .await
    }

    // =========================================================================
    // Order Methods
    // =========================================================================

    /// Place an order for the current cart, shipping to `address_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses the order or the request fails.
    #[instrument(skip(self, token), fields(address_id = %address_id))]
    pub async fn checkout(&self, token: &AuthToken, address_id: &AddressId) -> Result<(), ApiError> {
        let _: IgnoredAny = self
            .execute(
                self.inner
                    .client
                    .post(self.url("/cart/checkout"))
                    .bearer_auth(token.expose())
                    .json(&CheckoutRequest { address_id }),
            )
            .await?;
        Ok(())
    }
}

// =========================================================================
// Cart Methods
// =========================================================================

impl CartApi for ApiClient {
    #[instrument(skip(self, token))]
    async fn get_cart(&self, token: &AuthToken) -> Result<Vec<CartRecord>, ApiError> {
        self.execute(
            self.inner
                .client
                .get(self.url("/cart"))
                .bearer_auth(token.expose()),
        )
        .await
    }

    #[instrument(skip(self, token), fields(product_id = %record.product_id, qty = record.qty))]
    async fn update_cart(
        &self,
        token: &AuthToken,
        record: &CartRecord,
    ) -> Result<Vec<CartRecord>, ApiError> {
        self.execute(
            self.inner
                .client
                .post(self.url("/cart"))
                .bearer_auth(token.expose())
                .json(record),
        )
        .await
    }
}
