//! Storefront state container.
//!
//! [`Storefront`] owns the catalog client and the [`StoreState`], and is the
//! only writer of that state. Fetch operations follow one shape:
//!
//! 1. take a [`FetchTicket`] from the target slice (slice becomes `Loading`)
//! 2. await the request with no lock held
//! 3. settle the slice with the ticket; a newer fetch wins over an older one
//!
//! A 401 never lands in a slice: the fetch is abandoned and
//! [`StoreState::auth_required`] is raised instead.

pub mod slice;
pub mod state;

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use taiyuan_core::{CategoryId, CustomerDetails, Order, PaymentMethod, Product, ProductId};
use tokio::sync::RwLock;
use tracing::instrument;

pub use slice::{ErrorPolicy, FetchStatus, FetchTicket, QuerySlice, Settle};
pub use state::{CategoriesState, ProductsState, StoreState};

use crate::api::{ApiError, CatalogClient, FileTokenStore, ProductListParams};
use crate::cart::{NewLineItem, ShippingPolicy};
use crate::catalog::{CategoryNode, build_category_tree, find_node_with_subtree, root_categories};
use crate::config::StorefrontConfig;
use crate::error::add_breadcrumb;
use crate::orders::CheckoutError;

/// Shared storefront state and the operations that change it.
///
/// Cheap to clone; clones share the client and state.
#[derive(Clone)]
pub struct Storefront {
    inner: Arc<StorefrontInner>,
}

struct StorefrontInner {
    client: CatalogClient,
    state: RwLock<StoreState>,
    top_products_limit: u32,
}

impl Storefront {
    /// Create a storefront around an existing client.
    #[must_use]
    pub fn new(client: CatalogClient, shipping: ShippingPolicy, top_products_limit: u32) -> Self {
        Self {
            inner: Arc::new(StorefrontInner {
                client,
                state: RwLock::new(StoreState::new(shipping)),
                top_products_limit,
            }),
        }
    }

    /// Create a storefront from configuration, persisting the token on disk.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Setup` if the HTTP client cannot be constructed.
    pub fn from_config(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let tokens = Arc::new(FileTokenStore::new(&config.token_path));
        let client = CatalogClient::new(&config.api, tokens)?;
        Ok(Self::new(client, config.shipping, config.top_products_limit))
    }

    /// Get a reference to the catalog API client.
    #[must_use]
    pub fn client(&self) -> &CatalogClient {
        &self.inner.client
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.inner.state.read().await.clone()
    }

    /// Read the current state without copying it.
    pub async fn read<R>(&self, f: impl FnOnce(&StoreState) -> R) -> R {
        f(&*self.inner.state.read().await)
    }

    /// Clear the sign-in prompt raised by a 401.
    pub async fn acknowledge_auth(&self) {
        self.inner.state.write().await.acknowledge_auth();
    }

    // =========================================================================
    // Product Fetches
    // =========================================================================

    /// Fetch every product into the product list.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_products(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(
            |state| &mut state.products.list,
            client.list_products(&ProductListParams::default()),
        )
        .await
    }

    /// Fetch featured products.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_featured_products(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(
            |state| &mut state.products.featured,
            client.list_products(&ProductListParams::featured()),
        )
        .await
    }

    /// Fetch one product for the detail view.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn fetch_product(&self, id: &ProductId) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(|state| &mut state.products.current, client.get_product(id))
            .await
    }

    /// Fetch one category's products into the product list.
    ///
    /// Shares the list slice with [`Self::fetch_products`]; whichever was
    /// started last owns the result.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn fetch_products_by_category(&self, id: &CategoryId) -> Result<Settle, ApiError> {
        let client = self.client();
        let params = ProductListParams::in_category(id.clone());
        self.settle(
            |state| &mut state.products.list,
            client.list_products(&params),
        )
        .await
    }

    /// Fetch best sellers using the configured limit.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_top_products(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(
            |state| &mut state.products.top,
            client.top_products(self.inner.top_products_limit),
        )
        .await
    }

    // =========================================================================
    // Category Fetches
    // =========================================================================

    /// Fetch categories and settle both the forest and the root list.
    ///
    /// The returned [`Settle`] is the forest's.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in both slices.
    #[instrument(skip(self))]
    pub async fn fetch_categories(&self) -> Result<Settle, ApiError> {
        let (tree_ticket, roots_ticket) = {
            let mut state = self.inner.state.write().await;
            (state.categories.tree.begin(), state.categories.roots.begin())
        };

        let result = self.client().list_categories().await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(categories) => {
                let roots = root_categories(&categories);
                let forest = build_category_tree(&categories);
                tracing::debug!(
                    records = categories.len(),
                    roots = forest.len(),
                    "Built category tree"
                );
                let _ = state.categories.roots.succeed(roots_ticket, roots);
                Ok(state.categories.tree.succeed(tree_ticket, forest))
            }
            Err(error) => {
                let _ = settle_failure(&mut *state, roots_ticket, &error, |s| {
                    &mut s.categories.roots
                });
                let _ = settle_failure(&mut *state, tree_ticket, &error, |s| &mut s.categories.tree);
                Err(error)
            }
        }
    }

    /// Fetch one category and resolve its subtree from the full list.
    ///
    /// Falls back to a childless node when the category is missing from the
    /// list.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self), fields(category_id = %id))]
    pub async fn fetch_category(&self, id: &CategoryId) -> Result<Settle, ApiError> {
        let client = self.client();
        let fetch = async {
            let current = client.get_category(id).await?;
            let all = client.list_categories().await?;
            Ok::<_, ApiError>(find_node_with_subtree(&all, id).unwrap_or_else(|| {
                tracing::warn!("Category subtree unavailable, using the bare record");
                CategoryNode::leaf(current)
            }))
        };
        self.settle(|state| &mut state.categories.current, fetch)
            .await
    }

    // =========================================================================
    // Transport, Carousel and Settings Fetches
    // =========================================================================

    /// Fetch transport methods.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_transports(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(|state| &mut state.transports, client.list_transports())
            .await
    }

    /// Fetch home page carousel slides.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_carousels(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(|state| &mut state.carousels, client.list_carousels())
            .await
    }

    /// Fetch store settings.
    ///
    /// # Errors
    ///
    /// Returns the API error after recording it in the slice.
    #[instrument(skip(self))]
    pub async fn fetch_store_settings(&self) -> Result<Settle, ApiError> {
        let client = self.client();
        self.settle(|state| &mut state.settings, client.get_store_settings())
            .await
    }

    /// Products of `node` and every descendant category, one request per
    /// category, deduplicated by id. Slices are left untouched.
    ///
    /// # Errors
    ///
    /// Returns the first API error; a 401 also raises the sign-in prompt.
    #[instrument(skip(self, node), fields(category_id = %node.id()))]
    pub async fn products_in_category_tree(
        &self,
        node: &CategoryNode,
    ) -> Result<Vec<Product>, ApiError> {
        let mut ids = vec![node.id().clone()];
        ids.extend(node.descendant_ids());

        let mut seen = HashSet::new();
        let mut products = Vec::new();
        for id in ids {
            let batch = match self
                .client()
                .list_products(&ProductListParams::in_category(id))
                .await
            {
                Ok(batch) => batch,
                Err(error) => {
                    if error.is_unauthorized() {
                        self.inner.state.write().await.require_auth();
                    }
                    return Err(error);
                }
            };
            products.extend(
                batch
                    .into_iter()
                    .filter(|product| seen.insert(product.id.clone())),
            );
        }

        Ok(products)
    }

    // =========================================================================
    // Cart and Checkout
    // =========================================================================

    /// Add `quantity` units of `product` to the cart.
    ///
    /// The note is kept only for customizable products.
    pub async fn add_to_cart(&self, product: &Product, quantity: u32, note: Option<String>) {
        let line = NewLineItem::from_product(product, note);
        self.inner.state.write().await.cart.add_item(line, quantity);
        add_breadcrumb(
            "cart",
            "Added item",
            Some(&[
                ("product_id", product.id.as_str()),
                ("quantity", &quantity.to_string()),
            ]),
        );
    }

    /// Overwrite a line's quantity; zero removes it.
    pub async fn set_cart_quantity(&self, product_id: &ProductId, quantity: u32) {
        self.inner
            .state
            .write()
            .await
            .cart
            .set_quantity(product_id, quantity);
        add_breadcrumb(
            "cart",
            "Changed quantity",
            Some(&[
                ("product_id", product_id.as_str()),
                ("quantity", &quantity.to_string()),
            ]),
        );
    }

    /// Replace a line's customization note.
    pub async fn set_cart_note(&self, product_id: &ProductId, note: Option<String>) {
        self.inner
            .state
            .write()
            .await
            .cart
            .set_note(product_id, note);
    }

    /// Remove a line from the cart.
    pub async fn remove_from_cart(&self, product_id: &ProductId) {
        self.inner.state.write().await.cart.remove_item(product_id);
        add_breadcrumb(
            "cart",
            "Removed item",
            Some(&[("product_id", product_id.as_str())]),
        );
    }

    /// Empty the cart.
    pub async fn clear_cart(&self) {
        self.inner.state.write().await.cart.clear();
        add_breadcrumb("cart", "Cleared cart", None);
    }

    /// Place an order from the current cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if the cart has no lines.
    pub async fn checkout(
        &self,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
    ) -> Result<Order, CheckoutError> {
        let order = self
            .inner
            .state
            .write()
            .await
            .checkout(customer, payment_method, Utc::now())?;
        add_breadcrumb(
            "checkout",
            "Placed order",
            Some(&[("order_id", order.id.as_str())]),
        );
        Ok(order)
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Run `fetch` against the slice chosen by `pick`.
    async fn settle<T, P, F>(&self, pick: P, fetch: F) -> Result<Settle, ApiError>
    where
        P: Fn(&mut StoreState) -> &mut QuerySlice<T>,
        F: Future<Output = Result<T, ApiError>>,
    {
        let ticket = pick(&mut *self.inner.state.write().await).begin();

        let result = fetch.await;

        let mut state = self.inner.state.write().await;
        match result {
            Ok(data) => Ok(pick(&mut *state).succeed(ticket, data)),
            Err(error) => {
                let _ = settle_failure(&mut *state, ticket, &error, pick);
                Err(error)
            }
        }
    }
}

/// Record `error` in a slice, or raise the sign-in prompt for a 401.
fn settle_failure<T, P>(
    state: &mut StoreState,
    ticket: FetchTicket,
    error: &ApiError,
    pick: P,
) -> Settle
where
    P: Fn(&mut StoreState) -> &mut QuerySlice<T>,
{
    if error.is_unauthorized() {
        let settle = pick(state).abandon(ticket);
        state.require_auth();
        return settle;
    }

    tracing::warn!(error = %error, "Fetch failed");
    pick(state).fail(ticket, error.to_string())
}
