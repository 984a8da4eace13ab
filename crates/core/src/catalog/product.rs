//! Normalized catalog records.
//!
//! Products are created externally - by the fixture loader or the
//! provider mapping - and are read-only from the storefront's
//! perspective. Every optional field has a serde default so fixture data
//! can stay sparse.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId};

/// A catalog category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub slug: String,
    /// Gallery image URLs, first entry is the primary image.
    #[serde(default)]
    pub images: Vec<String>,
    /// Base price.
    pub price: Decimal,
    /// Discounted price; expected below `price` when set (not enforced).
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    /// Average review rating on a 0-5 scale.
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews_count: Option<u32>,
    #[serde(default)]
    pub category_ids: Vec<CategoryId>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Units on hand; `None` means stock is untracked.
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub short_desc: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Key-value specification table shown on the detail page.
    #[serde(default)]
    pub specs: BTreeMap<String, String>,
    /// View counter, drives the popularity ordering.
    #[serde(default)]
    pub views: Option<u64>,
    /// Promotes the product to the front of the default ordering.
    #[serde(default)]
    pub featured: bool,
    /// When the product entered the catalog; drives the "newest"
    /// ordering. Defaults to the epoch for records that never carried a
    /// timestamp, which sorts them last.
    #[serde(default = "unix_epoch")]
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// The price a buyer actually pays: the sale price when one is set,
    /// otherwise the base price.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        self.sale_price.unwrap_or(self.price)
    }

    /// Whether the product is tracked in stock with at least one unit.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.stock.is_some_and(|s| s > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_json() -> &'static str {
        r#"{"id":"1","name":"Silk Robe","slug":"silk-robe","price":"89.00"}"#
    }

    #[test]
    fn sale_price_wins_when_present() {
        let mut product: Product =
            serde_json::from_str(minimal_json()).expect("minimal product parses");
        assert_eq!(product.effective_price(), Decimal::from(89));

        product.sale_price = Some(Decimal::from(59));
        assert_eq!(product.effective_price(), Decimal::from(59));
    }

    #[test]
    fn optional_fields_default() {
        let product: Product =
            serde_json::from_str(minimal_json()).expect("minimal product parses");
        assert!(product.images.is_empty());
        assert!(product.tags.is_empty());
        assert!(product.specs.is_empty());
        assert!(!product.featured);
        assert_eq!(product.created_at, DateTime::UNIX_EPOCH);
        assert!(product.rating.is_none());
    }

    #[test]
    fn untracked_stock_counts_as_out_of_stock() {
        let mut product: Product =
            serde_json::from_str(minimal_json()).expect("minimal product parses");
        assert!(!product.in_stock());
        product.stock = Some(0);
        assert!(!product.in_stock());
        product.stock = Some(3);
        assert!(product.in_stock());
    }
}
