//! Order aggregate: checkout snapshots and the client-local order list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taiyuan_core::{CustomerDetails, Order, OrderId, OrderStatus, PaymentMethod};
use thiserror::Error;

use crate::cart::Cart;

/// Errors raised when submitting an order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    #[error("Cannot check out an empty cart")]
    EmptyCart,
}

/// Building an [`Order`] from live cart state.
pub trait OrderFromCart {
    /// Snapshot `cart` into a new order with status `processing`.
    ///
    /// Shipping comes from the cart's own policy, so the order total always
    /// equals `cart.total()` at the time of the snapshot. The order copies the
    /// cart's lines; later cart edits do not reach it.
    fn from_cart(
        cart: &Cart,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Self;
}

impl OrderFromCart for Order {
    fn from_cart(
        cart: &Cart,
        customer: CustomerDetails,
        payment_method: PaymentMethod,
        at: DateTime<Utc>,
    ) -> Self {
        let subtotal = cart.subtotal();
        let shipping = cart.shipping_cost(subtotal);

        Self {
            id: OrderId::for_timestamp(at),
            created_at: at,
            items: cart.items().to_vec(),
            subtotal,
            shipping,
            total: subtotal + shipping,
            customer: customer.into(),
            payment_method,
            status: OrderStatus::Processing,
        }
    }
}

/// Orders placed from this client, newest first.
///
/// Orders are never updated or removed here; status changes live on the
/// server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    orders: Vec<Order>,
}

impl OrderBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order to the front of the list.
    pub fn record(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// All orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Order with the given id.
    #[must_use]
    pub fn find(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
