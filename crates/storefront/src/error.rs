//! Unified error handling with Sentry integration.
//!
//! Each layer keeps its own error enum; [`StorefrontError`] wraps them for
//! callers (the CLI) that drive several layers at once. [`report`] captures
//! a failure to Sentry before it is surfaced.

use thiserror::Error;

use crate::api::{ApiError, TokenStoreError};
use crate::config::ConfigError;
use crate::orders::CheckoutError;

/// Umbrella error for the storefront library.
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Catalog API request failed.
    #[error("Catalog API error: {0}")]
    Api(#[from] ApiError),

    /// Token could not be persisted.
    #[error("Token store error: {0}")]
    Token(#[from] TokenStoreError),

    /// Order submission was rejected.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// State could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorefrontError {
    /// Whether the failure points at the service or the environment rather
    /// than at the caller's input.
    #[must_use]
    pub const fn is_operational(&self) -> bool {
        match self {
            Self::Api(err) => !matches!(
                err,
                ApiError::Unauthorized | ApiError::RateLimited(_)
            ),
            Self::Token(_) | Self::Serialization(_) => true,
            Self::Config(_) | Self::Checkout(_) | Self::NotFound(_) => false,
        }
    }
}

/// Result type alias for `StorefrontError`.
pub type Result<T> = std::result::Result<T, StorefrontError>;

/// Log an error and, for operational failures, capture it to Sentry.
pub fn report(error: &StorefrontError) {
    if error.is_operational() {
        let event_id = sentry::capture_error(error);
        tracing::error!(
            error = %error,
            sentry_event_id = %event_id,
            "Storefront error"
        );
    } else {
        tracing::warn!(error = %error, "Storefront error");
    }
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added item", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}
