//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::{CatalogClient, ProductCatalog};
use crate::config::StorefrontConfig;
use crate::content::ContentStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the configuration, the loaded catalog, the optional remote provider
/// client, and the blog content.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: ProductCatalog,
    remote: Option<CatalogClient>,
    content: ContentStore,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The remote catalog client is constructed only when the
    /// configuration carries a provider URL.
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: ProductCatalog, content: ContentStore) -> Self {
        let remote = config.catalog_api.as_ref().map(CatalogClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                remote,
                content,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the loaded product catalog.
    #[must_use]
    pub fn catalog(&self) -> &ProductCatalog {
        &self.inner.catalog
    }

    /// Get a reference to the remote provider client, when configured.
    #[must_use]
    pub fn remote(&self) -> Option<&CatalogClient> {
        self.inner.remote.as_ref()
    }

    /// Get a reference to the blog content store.
    #[must_use]
    pub fn content(&self) -> &ContentStore {
        &self.inner.content
    }
}
