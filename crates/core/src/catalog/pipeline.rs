//! Catalog listing derivation: filter, then stable sort.
//!
//! This is a pure read over the product collection. The input slice and
//! the filter state are never mutated; callers get a fresh ordered
//! listing on every invocation.

use std::cmp::Reverse;

use crate::catalog::{FilterState, Product, SortKey};

/// Derive the ordered listing for the catalog page.
#[must_use]
pub fn derive_listing(products: &[Product], filters: &FilterState, sort: SortKey) -> Vec<Product> {
    let mut listing: Vec<Product> = products
        .iter()
        .filter(|product| passes(product, filters))
        .cloned()
        .collect();
    sort_listing(&mut listing, sort);
    listing
}

/// True when `product` passes every active filter (AND-combined).
fn passes(product: &Product, filters: &FilterState) -> bool {
    // Free-text query: substring match on name or any tag.
    if !filters.query.is_empty() {
        let query = filters.query.to_lowercase();
        let name_match = product.name.to_lowercase().contains(&query);
        let tag_match = product
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&query));
        if !name_match && !tag_match {
            return false;
        }
    }

    // Category: selected set must intersect the product's categories.
    if !filters.categories.is_empty()
        && !product
            .category_ids
            .iter()
            .any(|id| filters.categories.contains(id))
    {
        return false;
    }

    if !filters.price_range.contains(product.effective_price()) {
        return false;
    }

    // Rating: unrated products fail while the filter is active.
    if !filters.ratings.is_empty() {
        let Some(rating) = product.rating else {
            return false;
        };
        if !filters
            .ratings
            .iter()
            .any(|&threshold| rating >= f64::from(threshold))
        {
            return false;
        }
    }

    if filters.in_stock_only && !product.in_stock() {
        return false;
    }

    true
}

fn sort_listing(listing: &mut [Product], sort: SortKey) {
    match sort {
        SortKey::PriceAsc => listing.sort_by_key(Product::effective_price),
        SortKey::PriceDesc => listing.sort_by_key(|p| Reverse(p.effective_price())),
        SortKey::Rating => {
            listing.sort_by(|a, b| rating_or_zero(b).total_cmp(&rating_or_zero(a)));
        }
        SortKey::Popularity => listing.sort_by_key(|p| Reverse(p.views.unwrap_or(0))),
        SortKey::Newest => listing.sort_by_key(|p| Reverse(p.created_at)),
        SortKey::Relevance => {
            listing.sort_by_key(|p| (Reverse(p.featured), Reverse(p.views.unwrap_or(0))));
        }
    }
}

fn rating_or_zero(product: &Product) -> f64 {
    product.rating.unwrap_or(0.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeSet;

    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use super::*;
    use crate::catalog::PriceRange;
    use crate::types::{CategoryId, ProductId};

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            slug: format!("product-{id}"),
            images: Vec::new(),
            price: Decimal::from(price),
            sale_price: None,
            rating: None,
            reviews_count: None,
            category_ids: Vec::new(),
            tags: Vec::new(),
            stock: None,
            short_desc: None,
            description: None,
            specs: std::collections::BTreeMap::new(),
            views: None,
            featured: false,
            created_at: chrono::DateTime::UNIX_EPOCH,
        }
    }

    fn ids(listing: &[Product]) -> Vec<&str> {
        listing.iter().map(|p| p.id.as_str()).collect()
    }

    #[test]
    fn disabled_filters_return_full_collection() {
        let products = vec![product("1", 10), product("2", 20), product("3", 30)];
        let listing = derive_listing(&products, &FilterState::default(), SortKey::default());
        assert_eq!(listing.len(), products.len());
    }

    #[test]
    fn derivation_is_pure_and_idempotent() {
        let products = vec![
            Product {
                featured: true,
                ..product("1", 100)
            },
            Product {
                views: Some(500),
                ..product("2", 50)
            },
        ];
        let snapshot = products.clone();
        let filters = FilterState {
            query: "product".to_owned(),
            ..FilterState::default()
        };

        let first = derive_listing(&products, &filters, SortKey::Popularity);
        let second = derive_listing(&products, &filters, SortKey::Popularity);

        assert_eq!(first, second);
        assert_eq!(products, snapshot);
    }

    #[test]
    fn price_ascending_is_monotone_in_effective_price() {
        let products = vec![
            product("a", 80),
            Product {
                sale_price: Some(Decimal::from(5)),
                ..product("b", 90)
            },
            product("c", 15),
            product("d", 15),
        ];
        let listing = derive_listing(&products, &FilterState::default(), SortKey::PriceAsc);
        for pair in listing.windows(2) {
            assert!(pair[0].effective_price() <= pair[1].effective_price());
        }
        // Equal keys keep input order (stable sort).
        assert_eq!(ids(&listing), vec!["b", "c", "d", "a"]);
    }

    #[test]
    fn sale_price_drives_price_ordering_and_relevance_prefers_featured() {
        let products = vec![
            Product {
                featured: true,
                ..product("1", 100)
            },
            Product {
                sale_price: Some(Decimal::from(40)),
                ..product("2", 50)
            },
        ];

        let by_price = derive_listing(&products, &FilterState::default(), SortKey::PriceAsc);
        assert_eq!(ids(&by_price), vec!["2", "1"]);

        let by_relevance = derive_listing(&products, &FilterState::default(), SortKey::Relevance);
        assert_eq!(ids(&by_relevance), vec!["1", "2"]);
    }

    #[test]
    fn price_range_filters_on_effective_price() {
        let products = vec![
            Product {
                featured: true,
                ..product("1", 100)
            },
            Product {
                sale_price: Some(Decimal::from(40)),
                ..product("2", 50)
            },
        ];
        let filters = FilterState {
            price_range: PriceRange::new(Decimal::ZERO, Decimal::from(45)),
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["2"]);
    }

    #[test]
    fn query_matches_name_or_tags_case_insensitively() {
        let products = vec![
            Product {
                name: "Lavender Massage Oil".to_owned(),
                ..product("1", 20)
            },
            Product {
                tags: vec!["Massage".to_owned()],
                ..product("2", 30)
            },
            product("3", 40),
        ];
        let filters = FilterState {
            query: "mAsSaGe".to_owned(),
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["1", "2"]);
    }

    #[test]
    fn category_filter_intersects_selections() {
        let products = vec![
            Product {
                category_ids: vec![CategoryId::new("oils")],
                ..product("1", 20)
            },
            Product {
                category_ids: vec![CategoryId::new("candles"), CategoryId::new("gifts")],
                ..product("2", 30)
            },
        ];
        let filters = FilterState {
            categories: BTreeSet::from([CategoryId::new("gifts"), CategoryId::new("bath")]),
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["2"]);
    }

    #[test]
    fn active_rating_filter_rejects_unrated_products() {
        let products = vec![
            Product {
                rating: Some(4.5),
                ..product("1", 20)
            },
            Product {
                rating: Some(2.0),
                ..product("2", 30)
            },
            product("3", 40),
        ];
        let filters = FilterState {
            ratings: BTreeSet::from([4]),
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["1"]);
    }

    #[test]
    fn rating_passes_when_any_threshold_is_met() {
        let products = vec![Product {
            rating: Some(3.2),
            ..product("1", 20)
        }];
        let filters = FilterState {
            ratings: BTreeSet::from([3, 5]),
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["1"]);
    }

    #[test]
    fn stock_filter_requires_tracked_positive_stock() {
        let products = vec![
            Product {
                stock: Some(5),
                ..product("1", 20)
            },
            Product {
                stock: Some(0),
                ..product("2", 30)
            },
            product("3", 40),
        ];
        let filters = FilterState {
            in_stock_only: true,
            ..FilterState::default()
        };

        let listing = derive_listing(&products, &filters, SortKey::default());
        assert_eq!(ids(&listing), vec!["1"]);
    }

    #[test]
    fn rating_sort_treats_missing_as_zero() {
        let products = vec![
            product("1", 20),
            Product {
                rating: Some(4.8),
                ..product("2", 30)
            },
            Product {
                rating: Some(3.1),
                ..product("3", 40)
            },
        ];
        let listing = derive_listing(&products, &FilterState::default(), SortKey::Rating);
        assert_eq!(ids(&listing), vec!["2", "3", "1"]);
    }

    #[test]
    fn newest_sorts_by_creation_time_descending() {
        let at = |year| chrono::Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).unwrap();
        let products = vec![
            Product {
                created_at: at(2023),
                ..product("1", 20)
            },
            Product {
                created_at: at(2025),
                ..product("2", 30)
            },
            // Never timestamped: defaults to the epoch, sorts last.
            product("3", 40),
        ];
        let listing = derive_listing(&products, &FilterState::default(), SortKey::Newest);
        assert_eq!(ids(&listing), vec!["2", "1", "3"]);
    }

    #[test]
    fn relevance_breaks_featured_ties_by_views() {
        let products = vec![
            Product {
                featured: true,
                views: Some(10),
                ..product("1", 20)
            },
            Product {
                featured: true,
                views: Some(90),
                ..product("2", 30)
            },
            Product {
                views: Some(10_000),
                ..product("3", 40)
            },
        ];
        let listing = derive_listing(&products, &FilterState::default(), SortKey::Relevance);
        assert_eq!(ids(&listing), vec!["2", "1", "3"]);
    }
}
