//! Taiyuan Core - Shared domain types for the storefront client.
//!
//! This crate provides the types used across the Taiyuan components:
//! - `storefront` - Catalog API client, client-side state and aggregates
//! - `cli` - Command-line catalog browser
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no state.
//! Records mirror the catalog API's JSON so they can be decoded directly
//! from response bodies.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, status tags, catalog records, orders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
