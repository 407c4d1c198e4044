//! Catalog records as served by the catalog API.
//!
//! Field names follow the API's camelCase JSON. Only the identifier is
//! mandatory; everything else falls back to a default so a sparse record
//! (e.g. a product embedded in a category) still decodes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::id::{CarouselId, CategoryId, ProductId, TransportId};
use crate::types::price::Price;

// =============================================================================
// Products
// =============================================================================

/// A sellable product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Price,
    /// List price before discount, shown struck through.
    #[serde(default)]
    pub original_price: Option<Price>,
    /// Discount percentage badge.
    #[serde(default)]
    pub discount: Option<Decimal>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Whether the buyer may attach a free-text note to the cart line.
    #[serde(default)]
    pub is_customizable: bool,
    /// Transport methods this product can ship with.
    #[serde(default)]
    pub transport: Vec<TransportId>,
    #[serde(default)]
    pub category: Option<CategoryId>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Minimal active product, mostly useful for fixtures.
    #[must_use]
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            price,
            original_price: None,
            discount: None,
            stock: 0,
            images: Vec::new(),
            is_active: true,
            is_customizable: false,
            transport: Vec::new(),
            category: None,
            created_at: None,
        }
    }

    /// First image, used as the cart thumbnail.
    #[must_use]
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Whether `quantity` units fit the live stock count.
    #[must_use]
    pub const fn is_in_stock(&self, quantity: u32) -> bool {
        quantity > 0 && quantity <= self.stock
    }

    /// Whether the product ships with the given transport method.
    #[must_use]
    pub fn ships_with(&self, transport: &TransportId) -> bool {
        self.transport.contains(transport)
    }
}

/// A product as embedded in another record: either the populated document
/// or only its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductRef {
    // Must be tried first: a populated document would also decode as an id.
    Full(Box<Product>),
    Id(ProductId),
}

impl ProductRef {
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Full(product) => &product.id,
            Self::Id(id) => id,
        }
    }

    /// The populated document, if the API sent one.
    #[must_use]
    pub fn product(&self) -> Option<&Product> {
        match self {
            Self::Full(product) => Some(product),
            Self::Id(_) => None,
        }
    }
}

impl From<Product> for ProductRef {
    fn from(product: Product) -> Self {
        Self::Full(Box::new(product))
    }
}

impl From<ProductId> for ProductRef {
    fn from(id: ProductId) -> Self {
        Self::Id(id)
    }
}

// =============================================================================
// Categories
// =============================================================================

/// A flat category record.
///
/// Categories form a forest through `parent_category`; the tree itself is
/// assembled client-side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent reference; bare id or populated document.
    #[serde(default)]
    pub parent_category: Option<CategoryId>,
    /// Products assigned directly to this category, populated or bare ids.
    #[serde(default)]
    pub products: Vec<ProductRef>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl Category {
    /// Active category with no parent and no products.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_category: None,
            products: Vec::new(),
            is_active: true,
        }
    }

    /// Set the parent reference.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<CategoryId>) -> Self {
        self.parent_category = Some(parent.into());
        self
    }

    /// Set the directly assigned products.
    #[must_use]
    pub fn with_products<I>(mut self, products: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ProductRef>,
    {
        self.products = products.into_iter().map(Into::into).collect();
        self
    }

    /// Whether the record carries no parent reference at all.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_category.is_none()
    }
}

// =============================================================================
// Transports
// =============================================================================

/// A shipping method a product may be delivered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transport {
    #[serde(rename = "_id")]
    pub id: TransportId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fee: Price,
}

// =============================================================================
// Carousel
// =============================================================================

/// A home page carousel slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarouselItem {
    #[serde(rename = "_id", alias = "id")]
    pub id: CarouselId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub link: Option<String>,
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_sparse_record_defaults() {
        let product: Product = serde_json::from_str(r#"{ "_id": "p1", "name": "Oolong" }"#).unwrap();
        assert_eq!(product.id.as_str(), "p1");
        assert!(product.is_active);
        assert!(!product.is_customizable);
        assert_eq!(product.price, Price::ZERO);
        assert!(product.transport.is_empty());
    }

    #[test]
    fn test_product_transport_accepts_populated_and_bare_refs() {
        let product: Product = serde_json::from_str(
            r#"{
                "_id": "p1",
                "price": 120,
                "transport": [{ "_id": "t1", "name": "Home delivery" }, "t2"],
                "createdAt": "2024-03-01T10:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(
            product.transport,
            vec![TransportId::new("t1"), TransportId::new("t2")]
        );
        assert!(product.ships_with(&TransportId::new("t2")));
        assert!(product.created_at.is_some());
    }

    #[test]
    fn test_product_stock_check() {
        let mut product = Product::new("p1", "Oolong", Price::from_units(100));
        product.stock = 3;
        assert!(product.is_in_stock(3));
        assert!(!product.is_in_stock(4));
        assert!(!product.is_in_stock(0));
    }

    #[test]
    fn test_category_parent_reference_shapes() {
        let populated: Category = serde_json::from_str(
            r#"{ "_id": "c2", "name": "Green", "parentCategory": { "_id": "c1", "name": "Tea" } }"#,
        )
        .unwrap();
        assert_eq!(populated.parent_category, Some(CategoryId::new("c1")));

        let bare: Category =
            serde_json::from_str(r#"{ "_id": "c2", "parentCategory": "c1" }"#).unwrap();
        assert_eq!(bare.parent_category, Some(CategoryId::new("c1")));

        let root: Category =
            serde_json::from_str(r#"{ "_id": "c1", "parentCategory": null }"#).unwrap();
        assert!(root.is_root());
    }

    #[test]
    fn test_category_products_accept_bare_and_populated_refs() {
        let category: Category = serde_json::from_str(
            r#"{ "_id": "c1", "products": ["p1", { "_id": "p2", "name": "Oolong", "price": 120 }, 7] }"#,
        )
        .unwrap();

        let ids: Vec<&str> = category.products.iter().map(|p| p.id().as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "7"]);
        assert!(category.products[0].product().is_none());
        assert_eq!(category.products[1].product().unwrap().name, "Oolong");
    }

    #[test]
    fn test_product_ref_serializes_in_received_shape() {
        let refs = vec![
            ProductRef::from(ProductId::new("p1")),
            ProductRef::from(Product::new("p2", "Oolong", Price::from_units(120))),
        ];
        let json = serde_json::to_value(&refs).unwrap();
        assert_eq!(json[0], "p1");
        assert_eq!(json[1]["_id"], "p2");
    }

    #[test]
    fn test_carousel_accepts_either_id_key() {
        let a: CarouselItem =
            serde_json::from_str(r#"{ "_id": "k1", "imageUrl": "a.jpg" }"#).unwrap();
        let b: CarouselItem = serde_json::from_str(r#"{ "id": "k2", "imageUrl": "b.jpg" }"#).unwrap();
        assert_eq!(a.id.as_str(), "k1");
        assert_eq!(b.id.as_str(), "k2");
        assert_eq!(b.image_url, "b.jpg");
    }
}
