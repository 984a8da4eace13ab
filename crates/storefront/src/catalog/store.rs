//! Startup-loaded catalog fixtures.
//!
//! The storefront's static commerce data - products, categories, and
//! shipping methods - is loaded once from JSON files in the content
//! directory and held read-only for the lifetime of the process. The
//! interface never mutates a product record.

use std::path::Path;
use std::sync::Arc;

use velour_core::{Category, CategoryId, Product, ProductId};

use crate::content::ContentError;

/// Read-only catalog data loaded at startup.
#[derive(Debug, Clone)]
pub struct ProductCatalog {
    products: Arc<Vec<Product>>,
    categories: Arc<Vec<Category>>,
    shipping_methods: Arc<Vec<ShippingMethod>>,
}

/// A shipping method shown on the shipping information page.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ShippingMethod {
    pub id: String,
    pub name: String,
    /// Human-readable delivery estimate, e.g. "2-4 business days".
    pub eta: String,
    #[serde(default)]
    pub regions: Vec<String>,
    /// Human-readable pricing description.
    pub price_rules: String,
}

impl ProductCatalog {
    /// Load all fixture files from the content directory.
    ///
    /// Expects `products.json`, `categories.json`, and `shipping.json`.
    /// A missing shipping file degrades to an empty list; products and
    /// categories are required.
    ///
    /// # Errors
    ///
    /// Returns an error if a required file cannot be read or parsed.
    pub fn load(content_dir: &Path) -> Result<Self, ContentError> {
        let products: Vec<Product> = load_json(&content_dir.join("products.json"))?;
        let categories: Vec<Category> = load_json(&content_dir.join("categories.json"))?;

        let shipping_path = content_dir.join("shipping.json");
        let shipping_methods: Vec<ShippingMethod> = if shipping_path.exists() {
            load_json(&shipping_path)?
        } else {
            tracing::warn!("Shipping fixture missing: {:?}", shipping_path);
            Vec::new()
        };

        tracing::info!(
            products = products.len(),
            categories = categories.len(),
            "Catalog fixtures loaded"
        );

        Ok(Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
            shipping_methods: Arc::new(shipping_methods),
        })
    }

    /// Build a catalog directly from records (used by tests).
    #[must_use]
    pub fn from_records(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            products: Arc::new(products),
            categories: Arc::new(categories),
            shipping_methods: Arc::new(Vec::new()),
        }
    }

    /// The full product collection.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    #[must_use]
    pub fn shipping_methods(&self) -> &[ShippingMethod] {
        &self.shipping_methods
    }

    /// Look up a product by identifier.
    #[must_use]
    pub fn by_id(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == *id)
    }

    /// Look up a product by slug.
    #[must_use]
    pub fn by_slug(&self, slug: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.slug == slug)
    }

    /// Number of products carrying a category.
    #[must_use]
    pub fn count_in_category(&self, id: &CategoryId) -> usize {
        self.products
            .iter()
            .filter(|p| p.category_ids.contains(id))
            .count()
    }
}

/// Read and parse one JSON fixture file.
fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ContentError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| ContentError::Io(format!("{}: {e}", path.display())))?;
    serde_json::from_str(&raw).map_err(|e| ContentError::Parse(format!("{}: {e}", path.display())))
}
