//! Catalog browsing commands.
//!
//! Every command goes through the [`Storefront`] container, so the same
//! slice state a UI would render is what gets printed here.

use taiyuan_core::{CategoryId, ProductId};
use taiyuan_storefront::catalog::ProductQuery;
use taiyuan_storefront::{Storefront, StorefrontError};

use crate::output;

/// Catalog commands bound to one storefront.
pub struct Catalog {
    storefront: Storefront,
    json: bool,
}

impl Catalog {
    pub const fn new(storefront: Storefront, json: bool) -> Self {
        Self { storefront, json }
    }

    /// Root categories, or the whole forest with `tree`.
    pub async fn categories(&self, tree: bool) -> Result<(), StorefrontError> {
        self.storefront.fetch_categories().await?;
        let state = self.storefront.snapshot().await;

        if tree {
            let forest = state.categories.tree.data().cloned().unwrap_or_default();
            if self.json {
                return output::json(&forest);
            }
            output::forest(&forest);
        } else {
            let roots = state.categories.roots.data().cloned().unwrap_or_default();
            if self.json {
                return output::json(&roots);
            }
            output::categories(&roots);
        }
        Ok(())
    }

    /// One category plus the filtered products of its subtree.
    pub async fn category(&self, id: &str, query: &ProductQuery) -> Result<(), StorefrontError> {
        let id = CategoryId::new(id);
        self.storefront.fetch_category(&id).await?;

        let node = self
            .storefront
            .read(|state| state.categories.current.data().cloned())
            .await
            .ok_or_else(|| StorefrontError::NotFound(format!("category {id}")))?;

        let products = query.apply(&self.storefront.products_in_category_tree(&node).await?);
        tracing::debug!(
            category_id = %id,
            subcategories = node.descendant_ids().len(),
            shown = products.len(),
            "Resolved category products"
        );

        if self.json {
            return output::json(&serde_json::json!({
                "category": node.category,
                "children": node.children,
                "products": products,
            }));
        }

        output::forest(std::slice::from_ref(&node));
        output::blank_line();
        output::products(&products);
        Ok(())
    }

    /// Product listing, optionally scoped to a category or the featured set.
    pub async fn products(
        &self,
        category: Option<&str>,
        featured: bool,
        query: &ProductQuery,
    ) -> Result<(), StorefrontError> {
        let listing = if featured {
            self.storefront.fetch_featured_products().await?;
            self.storefront
                .read(|state| state.products.featured.data().cloned())
                .await
        } else {
            match category {
                Some(category) => {
                    self.storefront
                        .fetch_products_by_category(&CategoryId::new(category))
                        .await?
                }
                None => self.storefront.fetch_products().await?,
            };
            self.storefront
                .read(|state| state.products.list.data().cloned())
                .await
        };

        let products = query.apply(&listing.unwrap_or_default());
        if self.json {
            return output::json(&products);
        }
        output::products(&products);
        Ok(())
    }

    pub async fn product(&self, id: &str) -> Result<(), StorefrontError> {
        let id = ProductId::new(id);
        self.storefront.fetch_product(&id).await?;

        let product = self
            .storefront
            .read(|state| state.products.current.data().cloned())
            .await
            .ok_or_else(|| StorefrontError::NotFound(format!("product {id}")))?;

        if self.json {
            return output::json(&product);
        }
        output::product(&product);
        Ok(())
    }

    pub async fn top(&self) -> Result<(), StorefrontError> {
        self.storefront.fetch_top_products().await?;
        let products = self
            .storefront
            .read(|state| state.products.top.data().cloned())
            .await
            .unwrap_or_default();

        if self.json {
            return output::json(&products);
        }
        output::products(&products);
        Ok(())
    }

    pub async fn transports(&self) -> Result<(), StorefrontError> {
        self.storefront.fetch_transports().await?;
        let transports = self
            .storefront
            .read(|state| state.transports.data().cloned())
            .await
            .unwrap_or_default();

        if self.json {
            return output::json(&transports);
        }
        output::transports(&transports);
        Ok(())
    }

    pub async fn carousels(&self) -> Result<(), StorefrontError> {
        self.storefront.fetch_carousels().await?;
        let items = self
            .storefront
            .read(|state| state.carousels.data().cloned())
            .await
            .unwrap_or_default();

        if self.json {
            return output::json(&items);
        }
        output::carousels(&items);
        Ok(())
    }

    pub async fn settings(&self) -> Result<(), StorefrontError> {
        self.storefront.fetch_store_settings().await?;
        let settings = self
            .storefront
            .read(|state| state.settings.data().cloned())
            .await
            .unwrap_or_default();

        if self.json {
            return output::json(&settings);
        }
        output::settings(&settings);
        Ok(())
    }

    /// Tell the user when a request was rejected for bad credentials.
    pub async fn warn_if_signed_out(&self) {
        if self.storefront.read(|state| state.auth_required()).await {
            tracing::warn!("Stored token was rejected and has been cleared; run `ty-cli token set`");
            self.storefront.acknowledge_auth().await;
        }
    }
}
