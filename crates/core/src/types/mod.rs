//! Core types for the Taiyuan storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod id;
pub mod order;
pub mod price;
pub mod settings;
pub mod status;

pub use catalog::{CarouselItem, Category, Product, ProductRef, Transport};
pub use id::{CarouselId, CategoryId, OrderId, ProductId, TransportId};
pub use order::{CartLineItem, CustomerDetails, CustomerSnapshot, Order};
pub use price::Price;
pub use settings::{Appearance, Contact, SocialLinks, StoreAddress, StoreSettings};
pub use status::{OrderStatus, PaymentMethod};
