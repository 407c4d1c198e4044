//! Filtered and sorted product views.

use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use taiyuan_core::{Price, Product, TransportId};

/// Listing order for product views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Order as received from the server.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    /// Most recently created first; undated products last.
    Newest,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "featured" => Ok(Self::Featured),
            "price-low" => Ok(Self::PriceLow),
            "price-high" => Ok(Self::PriceHigh),
            "newest" => Ok(Self::Newest),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Criteria for a product view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    /// Case-insensitive substring matched against the name.
    pub search: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    /// Match products shipping with any of these; empty matches all.
    pub transports: Vec<TransportId>,
    pub active_only: bool,
    pub sort: SortOrder,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            search: None,
            min_price: None,
            max_price: None,
            transports: Vec::new(),
            active_only: true,
            sort: SortOrder::Featured,
        }
    }
}

impl ProductQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    #[must_use]
    pub const fn price_range(mut self, min: Option<Price>, max: Option<Price>) -> Self {
        self.min_price = min;
        self.max_price = max;
        self
    }

    #[must_use]
    pub fn transport(mut self, id: TransportId) -> Self {
        self.transports.push(id);
        self
    }

    #[must_use]
    pub const fn include_inactive(mut self) -> Self {
        self.active_only = false;
        self
    }

    #[must_use]
    pub const fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Whether `product` passes every filter.
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.active_only && !product.is_active {
            return false;
        }

        let term = self.search.as_deref().map(str::trim).unwrap_or_default();
        if !term.is_empty() && !product.name.to_lowercase().contains(&term.to_lowercase()) {
            return false;
        }

        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }

        self.transports.is_empty() || self.transports.iter().any(|t| product.ships_with(t))
    }

    /// Matching products in the requested order.
    #[must_use]
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut view: Vec<Product> = products
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect();

        match self.sort {
            SortOrder::Featured => {}
            SortOrder::PriceLow => view.sort_by_key(|p| p.price),
            SortOrder::PriceHigh => view.sort_by_key(|p| Reverse(p.price)),
            // `None` orders below `Some`, so reversing puts undated products last
            SortOrder::Newest => view.sort_by_key(|p| Reverse(p.created_at)),
        }

        view
    }
}
