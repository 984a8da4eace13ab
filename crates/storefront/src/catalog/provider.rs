//! Provider-shaped records and their mapping into the normalized shape.
//!
//! The provider API has its own record layout; this module is the only
//! place untyped external data enters the system. The mapping is total:
//! every optional provider field has a defined default, so a minimal
//! payload still produces a fully-formed [`Product`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use velour_core::{CategoryId, Product, ProductId};

/// Maximum length of the derived short description.
const SHORT_DESC_LEN: usize = 60;

/// A product record as returned by the provider API.
#[derive(Debug, Deserialize)]
pub struct ProviderProduct {
    pub id: i64,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub sale_price: Option<f64>,
    #[serde(default)]
    pub stock: Option<u32>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Response envelope of the list-by-category endpoint.
#[derive(Debug, Deserialize)]
pub struct ProviderProductList {
    pub products: Vec<ProviderProduct>,
}

/// Map a provider record into the normalized product shape.
///
/// The provider has no slug field; the identifier doubles as the slug.
pub fn map_provider_product(record: ProviderProduct) -> Product {
    let id = record.id.to_string();
    let short_desc = record
        .description
        .as_ref()
        .map(|d| d.chars().take(SHORT_DESC_LEN).collect());

    Product {
        id: ProductId::new(id.clone()),
        name: record.name,
        slug: id,
        images: record.main_image_url.into_iter().collect(),
        price: decimal_from(record.price),
        sale_price: record.sale_price.map(decimal_from),
        rating: record.average_rating,
        reviews_count: None,
        category_ids: record
            .category_ids
            .iter()
            .map(|cid| CategoryId::new(cid.to_string()))
            .collect(),
        tags: record.tags,
        stock: record.stock,
        short_desc,
        description: record.description,
        specs: std::collections::BTreeMap::new(),
        views: Some(record.views.unwrap_or(0)),
        featured: record.featured.unwrap_or(false),
        created_at: record.created_at.unwrap_or(DateTime::UNIX_EPOCH),
    }
}

/// Convert a provider float amount to a decimal price.
///
/// Non-finite values (the provider should never send them, but the
/// boundary is total) collapse to zero.
fn decimal_from(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_payload_maps_with_defaults() {
        let record: ProviderProduct =
            serde_json::from_str(r#"{"id":7,"name":"Rose Quartz Roller","price":24.5}"#)
                .expect("minimal payload parses");
        let product = map_provider_product(record);

        assert_eq!(product.id.as_str(), "7");
        assert_eq!(product.slug, "7");
        assert_eq!(product.price, Decimal::new(245, 1));
        assert!(product.sale_price.is_none());
        assert!(product.images.is_empty());
        assert!(product.category_ids.is_empty());
        assert!(product.tags.is_empty());
        assert!(!product.featured);
        assert_eq!(product.views, Some(0));
        assert_eq!(product.created_at, DateTime::UNIX_EPOCH);
    }

    #[test]
    fn full_payload_maps_every_field() {
        let json = r#"{
            "id": 12,
            "name": "Lavender Massage Oil",
            "price": 34.0,
            "sale_price": 29.0,
            "stock": 18,
            "main_image_url": "/static/products/lavender-oil.jpg",
            "average_rating": 4.6,
            "views": 820,
            "description": "Cold-pressed sweet almond base infused with lavender.",
            "category_ids": [2, 5],
            "tags": ["massage", "oil"],
            "featured": true,
            "created_at": "2025-04-02T09:30:00Z"
        }"#;
        let record: ProviderProduct = serde_json::from_str(json).expect("full payload parses");
        let product = map_provider_product(record);

        assert_eq!(product.name, "Lavender Massage Oil");
        assert_eq!(product.sale_price, Some(Decimal::from(29)));
        assert_eq!(product.effective_price(), Decimal::from(29));
        assert_eq!(product.stock, Some(18));
        assert_eq!(product.images, vec!["/static/products/lavender-oil.jpg"]);
        assert_eq!(product.rating, Some(4.6));
        assert_eq!(product.views, Some(820));
        assert_eq!(
            product.category_ids,
            vec![CategoryId::new("2"), CategoryId::new("5")]
        );
        assert!(product.featured);
        assert_eq!(product.created_at.to_rfc3339(), "2025-04-02T09:30:00+00:00");
    }

    #[test]
    fn short_description_is_a_truncation() {
        let long = "a".repeat(200);
        let record: ProviderProduct = serde_json::from_str(&format!(
            r#"{{"id":1,"name":"X","price":1.0,"description":"{long}"}}"#
        ))
        .expect("payload parses");
        let product = map_provider_product(record);

        assert_eq!(
            product.short_desc.as_deref().map(str::len),
            Some(SHORT_DESC_LEN)
        );
        assert_eq!(product.description.as_deref().map(str::len), Some(200));
    }
}
