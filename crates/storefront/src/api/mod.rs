//! Catalog API client.
//!
//! # Architecture
//!
//! - Plain JSON over HTTP via `reqwest`, one base URL for every endpoint
//! - The server is the source of truth; this client keeps no cache of its
//!   own (client-side state lives in [`crate::store`])
//! - A bearer token is attached whenever the [`TokenStore`] holds one; a
//!   401 evicts it
//! - Wrapped-or-bare payload ambiguity is resolved in [`envelope`]
//!
//! # Endpoints
//!
//! | Operation | Method + Path |
//! |---|---|
//! | List products | `GET /products?category=&featured=` |
//! | Get product | `GET /products/{id}` |
//! | List categories | `GET /categories` |
//! | Get category | `GET /categories/{id}` |
//! | List transports | `GET /transports` |
//! | Get transport | `GET /transports/{id}` |
//! | List carousels | `GET /carousel` |
//! | Store settings | `GET /store-settings` |
//! | Top products | `GET /analytics/top-products?limit=N` |
//!
//! # Example
//!
//! ```rust,ignore
//! use taiyuan_storefront::api::{CatalogClient, MemoryTokenStore, ProductListParams};
//!
//! let client = CatalogClient::new(&config.api, Arc::new(MemoryTokenStore::new()))?;
//! let products = client.list_products(&ProductListParams::default()).await?;
//! ```

pub mod envelope;
mod token;

use std::sync::Arc;

use reqwest::StatusCode;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use taiyuan_core::{
    CarouselItem, Category, CategoryId, Product, ProductId, StoreSettings, Transport, TransportId,
};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

pub use token::{FileTokenStore, MemoryTokenStore, TokenStore, TokenStoreError};

use crate::config::ApiConfig;

/// Longest slice of a response body kept in errors and logs.
const BODY_PREVIEW_CHARS: usize = 200;

/// Errors that can occur when talking to the catalog API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server rejected the credentials; the stored token was evicted.
    #[error("Unauthorized: sign in again")]
    Unauthorized,

    /// Rate limited by the server.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-2xx response.
    #[error("HTTP {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// Body was not valid JSON or did not decode into the expected record.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// JSON decoded but had an unexpected shape.
    #[error("Unexpected payload: {0}")]
    UnexpectedPayload(String),

    /// Request path could not be joined onto the base URL.
    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to build the underlying HTTP client.
    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl ApiError {
    /// Whether this is an authorization failure (handled by re-login, not
    /// by the per-slice error state).
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Filters accepted by `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProductListParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl ProductListParams {
    /// Products assigned to one category.
    #[must_use]
    pub fn in_category(category: CategoryId) -> Self {
        Self {
            category: Some(category),
            featured: None,
        }
    }

    /// Featured products only.
    #[must_use]
    pub const fn featured() -> Self {
        Self {
            category: None,
            featured: Some(true),
        }
    }
}

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the catalog API.
///
/// Cheap to clone; clones share the connection pool and token store.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    client: reqwest::Client,
    base_url: Url,
    tokens: Arc<dyn TokenStore>,
}

impl CatalogClient {
    /// Create a new catalog API client.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Setup` if the HTTP client cannot be constructed.
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Setup(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                client,
                base_url: config.base_url.clone(),
                tokens,
            }),
        })
    }

    /// Token store consulted on every request.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Issue a GET and return the decoded JSON body.
    async fn get_json<Q>(&self, path: &str, query: Option<&Q>) -> Result<Value, ApiError>
    where
        Q: Serialize + ?Sized,
    {
        let url = self.inner.base_url.join(path.trim_start_matches('/'))?;

        let mut request = self
            .inner
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(token) = self.inner.tokens.load() {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!(path, "Catalog API rejected credentials, evicting stored token");
            if let Err(e) = self.inner.tokens.clear() {
                tracing::error!(error = %e, "Failed to evict stored token");
            }
            return Err(ApiError::Unauthorized);
        }

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if !status.is_success() {
            let preview: String = body.chars().take(BODY_PREVIEW_CHARS).collect();
            tracing::error!(
                status = %status,
                path,
                body = %preview,
                "Catalog API returned non-success status"
            );
            return Err(ApiError::Status {
                status,
                body: preview,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path,
                body = %body.chars().take(BODY_PREVIEW_CHARS).collect::<String>(),
                "Failed to parse catalog API response"
            );
            ApiError::Parse(e)
        })
    }

    // =========================================================================
    // Product Methods
    // =========================================================================

    /// List products, optionally filtered by category or featured flag.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        params: &ProductListParams,
    ) -> Result<Vec<Product>, ApiError> {
        let payload = self.get_json("products", Some(params)).await?;
        let products: Vec<Product> = envelope::collection(payload, "products")?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a product.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let payload = self
            .get_json::<()>(&format!("products/{}", encode_segment(id.as_str())), None)
            .await?;
        envelope::entity(payload, "product")
    }

    /// Best sellers from the analytics endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn top_products(&self, limit: u32) -> Result<Vec<Product>, ApiError> {
        let payload = self
            .get_json("analytics/top-products", Some(&[("limit", limit)]))
            .await?;
        envelope::collection(payload, "topProducts")
    }

    // =========================================================================
    // Category Methods
    // =========================================================================

    /// List every category as flat records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, ApiError> {
        let payload = self.get_json::<()>("categories", None).await?;
        let categories: Vec<Category> = envelope::collection(payload, "categories")?;
        debug!(count = categories.len(), "Fetched categories");
        Ok(categories)
    }

    /// Get one category record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a category.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn get_category(&self, id: &CategoryId) -> Result<Category, ApiError> {
        let payload = self
            .get_json::<()>(&format!("categories/{}", encode_segment(id.as_str())), None)
            .await?;
        envelope::entity(payload, "category")
    }

    // =========================================================================
    // Transport, Carousel and Settings Methods
    // =========================================================================

    /// List transport methods.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn list_transports(&self) -> Result<Vec<Transport>, ApiError> {
        let payload = self.get_json::<()>("transports", None).await?;
        envelope::collection(payload, "transports")
    }

    /// Get one transport method.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not a transport.
    #[instrument(skip(self), fields(transport_id = %id))]
    pub async fn get_transport(&self, id: &TransportId) -> Result<Transport, ApiError> {
        let payload = self
            .get_json::<()>(&format!("transports/{}", encode_segment(id.as_str())), None)
            .await?;
        envelope::entity(payload, "transport")
    }

    /// List home page carousel slides.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is malformed.
    #[instrument(skip(self))]
    pub async fn list_carousels(&self) -> Result<Vec<CarouselItem>, ApiError> {
        let payload = self.get_json::<()>("carousel", None).await?;
        envelope::collection(payload, "carousels")
    }

    /// Get the store settings document.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the payload is not an object.
    #[instrument(skip(self))]
    pub async fn get_store_settings(&self) -> Result<StoreSettings, ApiError> {
        let payload = self.get_json::<()>("store-settings", None).await?;
        envelope::document(payload)
    }
}

/// Percent-encode an id for use as a single path segment.
fn encode_segment(raw: &str) -> String {
    url::form_urlencoded::byte_serialize(raw.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}
