//! Taiyuan storefront client library.
//!
//! Talks to the catalog API and keeps the client-side storefront state:
//! query-cache slices for every entity type, the category forest, the cart
//! and placed orders.
//!
//! # Example
//!
//! ```rust,ignore
//! use taiyuan_storefront::{Storefront, config::StorefrontConfig};
//!
//! let config = StorefrontConfig::from_env()?;
//! let storefront = Storefront::from_config(&config)?;
//! storefront.fetch_categories().await?;
//! let roots = storefront.read(|state| state.categories.roots.data().cloned()).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod catalog;
pub mod config;
pub mod error;
pub mod orders;
pub mod store;

pub use cart::{Cart, NewLineItem, ShippingPolicy};
pub use error::{Result, StorefrontError};
pub use store::{Settle, StoreState, Storefront};
