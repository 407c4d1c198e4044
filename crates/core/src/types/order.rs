//! Cart line items and submitted orders.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::id::{OrderId, ProductId};
use crate::types::price::Price;
use crate::types::status::{OrderStatus, PaymentMethod};

/// One product entry in the cart.
///
/// The quantity is independent of catalog stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: Option<String>,
    pub quantity: u32,
    /// Free-text customization note for customizable products.
    pub note: Option<String>,
}

impl CartLineItem {
    /// `unit_price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Contact and address details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub zip_code: String,
}

/// Customer snapshot stored on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSnapshot {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl From<CustomerDetails> for CustomerSnapshot {
    fn from(details: CustomerDetails) -> Self {
        Self {
            name: format!("{} {}", details.first_name, details.last_name),
            email: details.email,
            phone: details.phone,
            address: format!(
                "{}, {}, {}",
                details.address, details.city, details.zip_code
            ),
        }
    }
}

/// A submitted order.
///
/// The item list is a copy taken at submission time and never follows later
/// cart edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub items: Vec<CartLineItem>,
    pub subtotal: Price,
    pub shipping: Price,
    pub total: Price,
    pub customer: CustomerSnapshot,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

impl OrderId {
    /// Client-side order number derived from the submission time.
    #[must_use]
    pub fn for_timestamp(at: DateTime<Utc>) -> Self {
        Self::new(format!("ORD-{}", at.timestamp_millis()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_snapshot_joins_fields() {
        let snapshot = CustomerSnapshot::from(CustomerDetails {
            first_name: "Mei".to_string(),
            last_name: "Lin".to_string(),
            email: "mei@example.com".to_string(),
            phone: "0912345678".to_string(),
            address: "No. 5, Lane 3".to_string(),
            city: "Tainan".to_string(),
            zip_code: "700".to_string(),
        });
        assert_eq!(snapshot.name, "Mei Lin");
        assert_eq!(snapshot.address, "No. 5, Lane 3, Tainan, 700");
    }

    #[test]
    fn test_order_id_from_timestamp() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).unwrap_or_default();
        assert_eq!(OrderId::for_timestamp(at).as_str(), "ORD-1700000000123");
    }

    #[test]
    fn test_line_total() {
        let item = CartLineItem {
            product_id: ProductId::new("p1"),
            name: "Oolong".to_string(),
            unit_price: Price::from_cents(12_050),
            image: None,
            quantity: 3,
            note: None,
        };
        assert_eq!(item.line_total(), Price::from_cents(36_150));
    }
}
