//! Client-side cart aggregate.
//!
//! The cart holds at most one line per product. Totals are derived on
//! demand; nothing here talks to the network, and stock ceilings are left to
//! the caller (see [`Product::is_in_stock`](taiyuan_core::Product::is_in_stock)).

use serde::{Deserialize, Serialize};
use taiyuan_core::{CartLineItem, Price, Product, ProductId};

/// Free-shipping rule: a flat rate below the threshold, free at or above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingPolicy {
    pub free_threshold: Price,
    pub flat_rate: Price,
}

impl Default for ShippingPolicy {
    fn default() -> Self {
        Self {
            free_threshold: Price::from_units(500),
            flat_rate: Price::from_units(60),
        }
    }
}

impl ShippingPolicy {
    /// Shipping charged for `subtotal`.
    #[must_use]
    pub fn cost_for(&self, subtotal: Price) -> Price {
        if subtotal < self.free_threshold {
            self.flat_rate
        } else {
            Price::ZERO
        }
    }

    /// How much more must be spent to ship free; zero once reached.
    #[must_use]
    pub fn remaining_for_free(&self, subtotal: Price) -> Price {
        self.free_threshold.saturating_sub(subtotal)
    }
}

/// Fields for a line that is not yet in the cart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: Option<String>,
    pub note: Option<String>,
}

impl NewLineItem {
    /// Line fields taken from a catalog product. The note is kept only for
    /// customizable products.
    #[must_use]
    pub fn from_product(product: &Product, note: Option<String>) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.primary_image().map(str::to_string),
            note: note.filter(|_| product.is_customizable),
        }
    }
}

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartLineItem>,
    policy: ShippingPolicy,
}

impl Cart {
    /// Empty cart using the default shipping policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty cart using `policy`.
    #[must_use]
    pub const fn with_policy(policy: ShippingPolicy) -> Self {
        Self {
            items: Vec::new(),
            policy,
        }
    }

    /// Shipping rule applied to this cart.
    #[must_use]
    pub const fn policy(&self) -> &ShippingPolicy {
        &self.policy
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Line for `product_id`, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    fn get_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLineItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.quantity))
    }

    /// Add `quantity` units of a product.
    ///
    /// An existing line only has its quantity increased; its other fields are
    /// left untouched. A zero quantity is ignored.
    pub fn add_item(&mut self, line: NewLineItem, quantity: u32) {
        if quantity == 0 {
            return;
        }

        if let Some(existing) = self.get_mut(&line.product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
            return;
        }

        self.items.push(CartLineItem {
            product_id: line.product_id,
            name: line.name,
            unit_price: line.unit_price,
            image: line.image,
            quantity,
            note: line.note,
        });
    }

    /// Overwrite the quantity of an existing line. Zero removes the line;
    /// an absent product is a no-op.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id);
        } else if let Some(item) = self.get_mut(product_id) {
            item.quantity = quantity;
        }
    }

    /// Replace the customization note of an existing line. Blank clears it.
    pub fn set_note(&mut self, product_id: &ProductId, note: Option<String>) {
        if let Some(item) = self.get_mut(product_id) {
            item.note = note.filter(|n| !n.trim().is_empty());
        }
    }

    /// Drop the line for `product_id`, if present.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.items.retain(|item| &item.product_id != product_id);
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of `unit_price × quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartLineItem::line_total).sum()
    }

    /// Shipping for a given subtotal under this cart's policy.
    #[must_use]
    pub fn shipping_cost(&self, subtotal: Price) -> Price {
        self.policy.cost_for(subtotal)
    }

    /// Subtotal plus shipping.
    #[must_use]
    pub fn total(&self) -> Price {
        let subtotal = self.subtotal();
        subtotal + self.shipping_cost(subtotal)
    }

    /// How much more must be added to ship free.
    #[must_use]
    pub fn remaining_for_free_shipping(&self) -> Price {
        self.policy.remaining_for_free(self.subtotal())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, cents: i64) -> NewLineItem {
        NewLineItem {
            product_id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Price::from_cents(cents),
            image: None,
            note: None,
        }
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 10_000), 2);
        cart.add_item(line("p1", 10_000), 3);

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
    }

    #[test]
    fn test_add_existing_keeps_original_fields() {
        let mut cart = Cart::new();
        let mut first = line("p1", 10_000);
        first.note = Some("gift wrap".to_string());
        cart.add_item(first, 1);

        let mut second = line("p1", 99_900);
        second.name = "Renamed".to_string();
        cart.add_item(second, 1);

        let item = cart.get(&ProductId::new("p1")).map(Clone::clone);
        let item = item.unwrap_or_else(|| panic!("line missing"));
        assert_eq!(item.unit_price, Price::from_cents(10_000));
        assert_eq!(item.name, "Product p1");
        assert_eq!(item.note.as_deref(), Some("gift wrap"));
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 100), 4);
        cart.set_quantity(&ProductId::new("p1"), 1);
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 100), 4);
        cart.add_item(line("p2", 100), 1);
        cart.set_quantity(&ProductId::new("p1"), 0);
        assert_eq!(cart.len(), 1);
        assert!(cart.get(&ProductId::new("p1")).is_none());
    }

    #[test]
    fn test_set_quantity_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 100), 1);
        let before = cart.clone();
        cart.set_quantity(&ProductId::new("nope"), 9);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_missing_leaves_cart_unchanged() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 12_000), 2);
        cart.add_item(line("p2", 3_000), 1);
        let (len, subtotal, total) = (cart.len(), cart.subtotal(), cart.total());

        cart.remove_item(&ProductId::new("missing"));

        assert_eq!(cart.len(), len);
        assert_eq!(cart.subtotal(), subtotal);
        assert_eq!(cart.total(), total);
    }

    #[test]
    fn test_clear_zeroes_subtotal() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 12_000), 2);
        cart.clear();
        assert_eq!(cart.subtotal(), Price::ZERO);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_shipping_threshold_boundaries() {
        let cart = Cart::new();
        assert_eq!(cart.shipping_cost(Price::from_cents(49_999)), Price::from_units(60));
        assert_eq!(cart.shipping_cost(Price::from_units(500)), Price::ZERO);
        assert_eq!(cart.shipping_cost(Price::from_cents(50_001)), Price::ZERO);
    }

    #[test]
    fn test_total_includes_shipping_below_threshold() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 15_000), 2);
        assert_eq!(cart.subtotal(), Price::from_units(300));
        assert_eq!(cart.total(), Price::from_units(360));
        assert_eq!(cart.remaining_for_free_shipping(), Price::from_units(200));

        cart.add_item(line("p2", 20_000), 1);
        assert_eq!(cart.total(), Price::from_units(500));
        assert_eq!(cart.remaining_for_free_shipping(), Price::ZERO);
    }

    #[test]
    fn test_empty_cart_still_charges_flat_rate() {
        let cart = Cart::new();
        assert_eq!(cart.total(), Price::from_units(60));
    }

    #[test]
    fn test_custom_policy() {
        let policy = ShippingPolicy {
            free_threshold: Price::from_units(1000),
            flat_rate: Price::from_units(80),
        };
        let mut cart = Cart::with_policy(policy);
        cart.add_item(line("p1", 60_000), 1);
        assert_eq!(cart.total(), Price::from_units(680));
    }

    #[test]
    fn test_note_only_kept_for_customizable_products() {
        let mut product = Product::new("p1", "Engraved cup", Price::from_units(300));
        product.images = vec!["cup.jpg".to_string()];
        let plain = NewLineItem::from_product(&product, Some("Mei".to_string()));
        assert_eq!(plain.note, None);
        assert_eq!(plain.image.as_deref(), Some("cup.jpg"));

        product.is_customizable = true;
        let custom = NewLineItem::from_product(&product, Some("Mei".to_string()));
        assert_eq!(custom.note.as_deref(), Some("Mei"));
    }

    #[test]
    fn test_set_note_blank_clears() {
        let mut cart = Cart::new();
        cart.add_item(line("p1", 100), 1);
        cart.set_note(&ProductId::new("p1"), Some("hello".to_string()));
        assert_eq!(cart.items()[0].note.as_deref(), Some("hello"));
        cart.set_note(&ProductId::new("p1"), Some("  ".to_string()));
        assert_eq!(cart.items()[0].note, None);
    }
}
