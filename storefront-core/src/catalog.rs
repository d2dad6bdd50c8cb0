use std::sync::Arc;

use crate::api::StorefrontApi;
use crate::error::StorefrontError;
use crate::model::Product;
use crate::store::SessionStore;

/// Loads the product catalog into the session store.
///
/// The catalog is read-only once loaded. A failed load leaves the store
/// empty, so `load` can simply be called again.
#[derive(Clone)]
pub struct ProductCatalog {
    api: Arc<dyn StorefrontApi>,
    store: SessionStore,
}

impl ProductCatalog {
    pub fn new(api: Arc<dyn StorefrontApi>, store: SessionStore) -> Self {
        Self { api, store }
    }

    /// Fetch all products and seed the displayed (unfiltered) view.
    ///
    /// Once a load has succeeded, later calls return the cached snapshot
    /// without contacting the service.
    pub async fn load(&self) -> Result<Arc<Vec<Product>>, StorefrontError> {
        if let Some(catalog) = self.store.catalog() {
            return Ok(catalog);
        }

        let products = match self.api.list_products().await {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(error = %err, "Catalog load failed");
                return Err(match err {
                    // An empty catalog is not a "no results" state here.
                    StorefrontError::NotFound => StorefrontError::Rejected {
                        status: 404,
                        message: "Product catalog not found".into(),
                    },
                    other => other,
                });
            }
        };

        let catalog = self.store.install_catalog(products);
        tracing::info!(products = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// The loaded catalog, or an empty list before [`ProductCatalog::load`]
    /// succeeded.
    pub fn products(&self) -> Arc<Vec<Product>> {
        self.store.catalog().unwrap_or_default()
    }

    /// Products currently shown (the catalog, or the latest search result).
    pub fn displayed(&self) -> Arc<Vec<Product>> {
        self.store.displayed()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}
