//! End-to-end tests for the Taiyuan storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p taiyuan-integration-tests
//! ```
//!
//! No external services are needed: each test starts a [`StubCatalog`], an
//! in-process `axum` server on an ephemeral loopback port that answers with
//! canned JSON and records every request it sees.
//!
//! # Test Categories
//!
//! - `catalog_client` - Wire behavior of the catalog API client
//! - `storefront_state` - Slice transitions driven by the state container

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use taiyuan_storefront::Storefront;
use taiyuan_storefront::api::{CatalogClient, MemoryTokenStore, TokenStore};
use taiyuan_storefront::cart::ShippingPolicy;
use taiyuan_storefront::config::ApiConfig;
use tokio::task::JoinHandle;

/// Canned reply for one route.
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: StatusCode,
    body: Value,
    delay: Duration,
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl StubResponse {
    /// `200 OK` with a JSON body.
    #[must_use]
    pub fn json(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
            delay: Duration::ZERO,
            headers: Vec::new(),
        }
    }

    /// Arbitrary status with a JSON body.
    #[must_use]
    pub fn status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body,
            delay: Duration::ZERO,
            headers: Vec::new(),
        }
    }

    /// Hold the reply back for `delay`.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Add a response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &'static str) -> Self {
        self.headers.push((name, HeaderValue::from_static(value)));
        self
    }
}

/// A request the stub received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
}

#[derive(Default)]
struct StubState {
    routes: Mutex<HashMap<String, StubResponse>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// In-process stand-in for the catalog API.
pub struct StubCatalog {
    base_url: String,
    state: Arc<StubState>,
    server: JoinHandle<()>,
}

impl StubCatalog {
    /// Bind to an ephemeral port and start serving.
    ///
    /// # Panics
    ///
    /// Panics if the loopback listener cannot be bound.
    pub async fn start() -> Self {
        let state = Arc::new(StubState::default());
        let app = Router::new().fallback(respond).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub catalog listener");
        let addr = listener
            .local_addr()
            .expect("Failed to read stub catalog address");

        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            base_url: format!("http://{addr}/api"),
            state,
            server,
        }
    }

    /// Base URL to configure clients with (includes an `/api` prefix).
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a reply. `route` is a path below the base URL, optionally
    /// with an exact query string (`products?category=c1`); a reply
    /// registered without a query answers every query on that path.
    pub fn route(&self, route: &str, response: StubResponse) {
        self.state
            .routes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(format!("/api/{}", route.trim_start_matches('/')), response);
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Catalog client pointed at this stub.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn client(&self, tokens: Arc<dyn TokenStore>) -> CatalogClient {
        let mut config = ApiConfig::new(&self.base_url).expect("Stub base URL is valid");
        config.request_timeout = Duration::from_secs(5);
        CatalogClient::new(&config, tokens).expect("Failed to build catalog client")
    }

    /// Storefront with default shipping and an empty in-memory token store.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        self.storefront_with(Arc::new(MemoryTokenStore::new()))
    }

    /// Storefront over the given token store.
    #[must_use]
    pub fn storefront_with(&self, tokens: Arc<dyn TokenStore>) -> Storefront {
        Storefront::new(self.client(tokens), ShippingPolicy::default(), 5)
    }
}

impl Drop for StubCatalog {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn respond(State(state): State<Arc<StubState>>, uri: Uri, headers: HeaderMap) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().map(str::to_string);

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            path: path.clone(),
            query: query.clone(),
            authorization: headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string),
        });

    let reply = {
        let routes = state.routes.lock().unwrap_or_else(PoisonError::into_inner);
        query
            .as_ref()
            .and_then(|q| routes.get(&format!("{path}?{q}")))
            .or_else(|| routes.get(&path))
            .cloned()
    };

    let Some(reply) = reply else {
        return (
            StatusCode::NOT_FOUND,
            axum::Json(json!({ "message": format!("no stub for {path}") })),
        )
            .into_response();
    };

    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let mut response = (reply.status, axum::Json(reply.body)).into_response();
    for (name, value) in reply.headers {
        response.headers_mut().insert(name, value);
    }
    response
}

// =============================================================================
// Fixtures
// =============================================================================

/// Minimal product document.
#[must_use]
pub fn product_json(id: &str, name: &str, price: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "stock": 10,
        "images": [format!("https://img.example/{id}.jpg")],
        "isActive": true,
        "transport": [],
    })
}

/// Minimal category document with a populated parent reference.
#[must_use]
pub fn category_json(id: &str, name: &str, parent: Option<&str>, products: &[Value]) -> Value {
    json!({
        "_id": id,
        "name": name,
        "parentCategory": parent.map(|p| json!({ "_id": p, "name": "parent" })),
        "products": products,
        "isActive": true,
    })
}
