//! Client-side application state.
//!
//! One explicit state value replaces the ambient global store: every fetch
//! result lands in a named [`QuerySlice`], and cart and order changes go
//! through the methods here.

use chrono::{DateTime, Utc};
use serde::Serialize;
use taiyuan_core::{
    CarouselItem, Category, CustomerDetails, Order, PaymentMethod, Product, StoreSettings,
    Transport,
};

use super::slice::{ErrorPolicy, QuerySlice};
use crate::cart::{Cart, ShippingPolicy};
use crate::catalog::CategoryNode;
use crate::orders::{CheckoutError, OrderBook, OrderFromCart};

/// Product slices.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductsState {
    /// Full or per-category listing; both fetches write here.
    pub list: QuerySlice<Vec<Product>>,
    pub featured: QuerySlice<Vec<Product>>,
    /// Best sellers from analytics.
    pub top: QuerySlice<Vec<Product>>,
    /// Product on the detail page.
    pub current: QuerySlice<Product>,
}

/// Category slices.
#[derive(Debug, Clone, Serialize)]
pub struct CategoriesState {
    pub tree: QuerySlice<Vec<CategoryNode>>,
    /// Parentless records; cleared when a fetch fails.
    pub roots: QuerySlice<Vec<Category>>,
    /// Category on the category page, with its subtree.
    pub current: QuerySlice<CategoryNode>,
}

impl Default for CategoriesState {
    fn default() -> Self {
        Self {
            tree: QuerySlice::new(),
            roots: QuerySlice::with_policy(ErrorPolicy::ClearData),
            current: QuerySlice::new(),
        }
    }
}

/// Everything the storefront keeps on the client.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StoreState {
    pub products: ProductsState,
    pub categories: CategoriesState,
    pub transports: QuerySlice<Vec<Transport>>,
    pub carousels: QuerySlice<Vec<CarouselItem>>,
    pub settings: QuerySlice<StoreSettings>,
    pub cart: Cart,
    pub orders: OrderBook,
    auth_required: bool,
}

impl StoreState {
    /// Empty state whose cart uses `shipping`.
    #[must_use]
    pub fn new(shipping: ShippingPolicy) -> Self {
        Self {
            cart: Cart::with_policy(shipping),
            ..Self::default()
        }
    }

    /// Whether a 401 asked the user to sign in again.
    #[must_use]
    pub const fn auth_required(&self) -> bool {
        self.auth_required
    }

    /// Flag that the stored credentials were rejected.
    pub const fn require_auth(&mut self) {
        self.auth_required = true;
    }

    /// Clear the sign-in prompt once it has been handled.
    pub const fn acknowledge_auth(&mut self) {
        self.auth_required = false;
    }

    /// Turn the cart into an order, record it and empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::EmptyCart` if there is nothing to order.
    pub fn checkout(
        &mut self,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Result<Order, CheckoutError> {
        if self.cart.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        let order = Order::from_cart(&self.cart, customer, payment_method, at);
        self.orders.record(order.clone());
        self.cart.clear();

        tracing::info!(
            order_id = %order.id,
            total = %order.total,
            items = order.items.len(),
            "Order placed"
        );
        Ok(order)
    }
}
