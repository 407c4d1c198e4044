//! Bearer token management.
//!
//! # Usage
//!
//! ```bash
//! ty-cli token set <TOKEN>
//! ty-cli token status
//! ty-cli token clear
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_TOKEN_PATH` - File the token is written to

use std::path::Path;
use std::sync::Arc;

use secrecy::SecretString;
use taiyuan_storefront::StorefrontError;
use taiyuan_storefront::api::TokenStore;

/// Token commands over the store the catalog client reads from.
pub struct Tokens<'a> {
    store: &'a Arc<dyn TokenStore>,
    path: &'a Path,
}

impl<'a> Tokens<'a> {
    pub const fn new(store: &'a Arc<dyn TokenStore>, path: &'a Path) -> Self {
        Self { store, path }
    }

    /// Persist `token` for later requests.
    pub fn set(&self, token: String) -> Result<(), StorefrontError> {
        self.store.save(SecretString::from(token))?;
        tracing::info!(path = %self.path.display(), "Token saved");
        Ok(())
    }

    /// Forget the stored token.
    pub fn clear(&self) -> Result<(), StorefrontError> {
        self.store.clear()?;
        tracing::info!(path = %self.path.display(), "Token cleared");
        Ok(())
    }

    /// Report whether a token is stored, never its value.
    #[allow(clippy::print_stdout)]
    pub fn status(&self) {
        if self.store.load().is_some() {
            println!("Token stored at {}", self.path.display());
        } else {
            println!("No token stored ({})", self.path.display());
        }
    }
}
