//! Product route handlers.
//!
//! The catalog page owns the filter/sort interaction. Query parameters
//! mutate the session filter state, then the listing is derived fresh
//! from the full product collection. Each control round-trips only its
//! own dimension: a parameter that is absent leaves its filter
//! untouched, an empty value clears it, and `reset` clears everything.

use std::collections::BTreeSet;

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use velour_core::{
    CategoryId, FilterState, Product, ProductId, SortKey, derive_listing, display_usd,
};

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::session as session_state;
use crate::state::AppState;

/// Number of related products shown on the detail page.
const RELATED_COUNT: usize = 4;

// =============================================================================
// View Types
// =============================================================================

/// Product card data for grid templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub image: Option<String>,
    pub price: String,
    /// Struck-through base price when the product is on sale.
    pub compare_at: Option<String>,
    pub rating: Option<String>,
    pub reviews_count: Option<u32>,
    pub short_desc: Option<String>,
    pub in_stock: bool,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            image: product.images.first().cloned(),
            price: display_usd(product.effective_price()),
            compare_at: product.sale_price.map(|_| display_usd(product.price)),
            rating: product.rating.map(|r| format!("{r:.1}")),
            reviews_count: product.reviews_count,
            short_desc: product.short_desc.clone(),
            in_stock: product.in_stock(),
        }
    }
}

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub slug: String,
    pub name: String,
    pub images: Vec<String>,
    pub price: String,
    pub compare_at: Option<String>,
    pub rating: Option<String>,
    pub reviews_count: Option<u32>,
    pub description: Option<String>,
    pub specs: Vec<(String, String)>,
    pub tags: Vec<String>,
    pub in_stock: bool,
    pub stock: Option<u32>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            slug: product.slug.clone(),
            name: product.name.clone(),
            images: product.images.clone(),
            price: display_usd(product.effective_price()),
            compare_at: product.sale_price.map(|_| display_usd(product.price)),
            rating: product.rating.map(|r| format!("{r:.1}")),
            reviews_count: product.reviews_count,
            description: product.description.clone(),
            specs: product
                .specs
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            tags: product.tags.clone(),
            in_stock: product.in_stock(),
            stock: product.stock,
        }
    }
}

/// Sidebar category row.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub count: usize,
    pub selected: bool,
    pub toggle_url: String,
}

/// Rating threshold control.
#[derive(Clone)]
pub struct RatingView {
    pub threshold: u8,
    pub selected: bool,
    pub toggle_url: String,
}

/// Sort selector entry.
#[derive(Clone)]
pub struct SortView {
    pub label: &'static str,
    pub selected: bool,
    pub url: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Catalog page query parameters.
///
/// Absent parameter = leave that filter unchanged; empty value = clear
/// it. Multi-valued dimensions travel as comma-separated lists.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    /// Comma-separated category IDs.
    pub categories: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    /// Comma-separated rating thresholds (1-5).
    pub ratings: Option<String>,
    pub in_stock: Option<bool>,
    pub sort: Option<String>,
    /// Clear all filters before applying the rest.
    pub reset: Option<bool>,
}

/// Fold the query parameters into the session filter state.
fn apply_query(filters: &mut FilterState, sort: &mut SortKey, query: &CatalogQuery) {
    if let Some(q) = &query.q {
        filters.query = q.trim().to_owned();
    }
    if let Some(raw) = &query.categories {
        filters.categories = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(CategoryId::from)
            .collect();
    }
    if let Some(raw) = &query.min_price {
        filters.price_range.min = raw.trim().parse().unwrap_or(Decimal::ZERO);
    }
    if let Some(raw) = &query.max_price {
        filters.price_range.max = raw.trim().parse().unwrap_or(Decimal::MAX);
    }
    if let Some(raw) = &query.ratings {
        filters.ratings = raw
            .split(',')
            .filter_map(|s| s.trim().parse::<u8>().ok())
            .filter(|r| (1..=5).contains(r))
            .collect();
    }
    if let Some(flag) = query.in_stock {
        filters.in_stock_only = flag;
    }
    if let Some(raw) = &query.sort
        && let Some(parsed) = SortKey::parse(raw)
    {
        *sort = parsed;
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryView>,
    pub ratings: Vec<RatingView>,
    pub sorts: Vec<SortView>,
    pub result_count: usize,
    pub query: String,
    pub min_price: String,
    pub max_price: String,
    pub in_stock_only: bool,
    pub stock_toggle_url: String,
    pub filters_active: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
    pub related: Vec<ProductCardView>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the catalog page.
#[instrument(skip(state, session))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate> {
    let mut filter_state = session_state::load_filters(&session).await;
    let mut sort = session_state::load_sort(&session).await;

    if query.reset.unwrap_or(false) {
        filter_state.reset();
        sort = SortKey::default();
    }
    apply_query(&mut filter_state, &mut sort, &query);

    session_state::save_filters(&session, &filter_state).await?;
    session_state::save_sort(&session, sort).await?;

    let listing = derive_listing(state.catalog().products(), &filter_state, sort);

    Ok(ProductsIndexTemplate {
        result_count: listing.len(),
        products: listing.iter().map(ProductCardView::from).collect(),
        categories: category_views(&state, &filter_state),
        ratings: rating_views(&filter_state),
        sorts: sort_views(sort),
        query: filter_state.query.clone(),
        min_price: price_field(filter_state.price_range.min, Decimal::ZERO),
        max_price: price_field(filter_state.price_range.max, Decimal::MAX),
        in_stock_only: filter_state.in_stock_only,
        stock_toggle_url: format!("/products?in_stock={}", !filter_state.in_stock_only),
        filters_active: !filter_state.is_default(),
    })
}

/// Display the product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ProductShowTemplate> {
    let mut product = state.catalog().by_slug(&slug).cloned();

    // Not in the fixtures: ask the remote provider when configured. A
    // failed fetch reads as absence, not as an error page.
    if product.is_none()
        && let Some(client) = state.remote()
    {
        product = match client.product(&ProductId::new(slug.as_str())).await {
            Ok(found) => Some(found),
            Err(e) => {
                tracing::warn!("Remote product fetch failed for {slug}: {e}");
                None
            }
        };
    }

    let product = product.ok_or_else(|| AppError::NotFound(format!("product {slug}")))?;
    let related = related_products(&state, &product);

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(&product),
        related,
    })
}

// =============================================================================
// View Builders
// =============================================================================

fn category_views(state: &AppState, filters: &FilterState) -> Vec<CategoryView> {
    state
        .catalog()
        .categories()
        .iter()
        .map(|category| {
            let selected = filters.categories.contains(&category.id);
            let mut next: BTreeSet<CategoryId> = filters.categories.clone();
            if selected {
                next.remove(&category.id);
            } else {
                next.insert(category.id.clone());
            }
            CategoryView {
                name: category.name.clone(),
                count: state.catalog().count_in_category(&category.id),
                selected,
                toggle_url: format!("/products?categories={}", csv_param(&next)),
            }
        })
        .collect()
}

fn rating_views(filters: &FilterState) -> Vec<RatingView> {
    (1..=5u8)
        .rev()
        .map(|threshold| {
            let selected = filters.ratings.contains(&threshold);
            let mut next = filters.ratings.clone();
            if selected {
                next.remove(&threshold);
            } else {
                next.insert(threshold);
            }
            let list = next
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(",");
            RatingView {
                threshold,
                selected,
                toggle_url: format!("/products?ratings={list}"),
            }
        })
        .collect()
}

fn sort_views(active: SortKey) -> Vec<SortView> {
    [
        (SortKey::Relevance, "Relevance"),
        (SortKey::PriceAsc, "Price: Low to High"),
        (SortKey::PriceDesc, "Price: High to Low"),
        (SortKey::Rating, "Top Rated"),
        (SortKey::Popularity, "Most Popular"),
        (SortKey::Newest, "Newest"),
    ]
    .into_iter()
    .map(|(key, label)| SortView {
        label,
        selected: key == active,
        url: format!("/products?sort={}", key.as_str()),
    })
    .collect()
}

fn related_products(state: &AppState, product: &Product) -> Vec<ProductCardView> {
    let mut filters = FilterState::default();
    filters.categories.extend(product.category_ids.iter().cloned());
    if filters.categories.is_empty() {
        return Vec::new();
    }

    derive_listing(state.catalog().products(), &filters, SortKey::Relevance)
        .iter()
        .filter(|candidate| candidate.id != product.id)
        .take(RELATED_COUNT)
        .map(ProductCardView::from)
        .collect()
}

fn csv_param(set: &BTreeSet<CategoryId>) -> String {
    let list = set
        .iter()
        .map(CategoryId::as_str)
        .collect::<Vec<_>>()
        .join(",");
    urlencoding::encode(&list).into_owned()
}

/// Render a price bound as a form field value; the default bound shows
/// as an empty field.
fn price_field(value: Decimal, default: Decimal) -> String {
    if value == default {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_query() -> CatalogQuery {
        CatalogQuery {
            q: None,
            categories: None,
            min_price: None,
            max_price: None,
            ratings: None,
            in_stock: None,
            sort: None,
            reset: None,
        }
    }

    #[test]
    fn absent_params_leave_filters_untouched() {
        let mut filters = FilterState {
            query: "oil".to_owned(),
            in_stock_only: true,
            ..FilterState::default()
        };
        let mut sort = SortKey::Newest;

        apply_query(&mut filters, &mut sort, &empty_query());

        assert_eq!(filters.query, "oil");
        assert!(filters.in_stock_only);
        assert_eq!(sort, SortKey::Newest);
    }

    #[test]
    fn empty_values_clear_their_dimension() {
        let mut filters = FilterState {
            query: "oil".to_owned(),
            ..FilterState::default()
        };
        filters.categories.insert(CategoryId::new("bath"));
        filters.price_range.min = Decimal::from(10);
        let mut sort = SortKey::default();

        let query = CatalogQuery {
            q: Some(String::new()),
            categories: Some(String::new()),
            min_price: Some(String::new()),
            ..empty_query()
        };
        apply_query(&mut filters, &mut sort, &query);

        assert!(filters.query.is_empty());
        assert!(filters.categories.is_empty());
        assert_eq!(filters.price_range.min, Decimal::ZERO);
    }

    #[test]
    fn comma_lists_become_sets() {
        let mut filters = FilterState::default();
        let mut sort = SortKey::default();

        let query = CatalogQuery {
            categories: Some("bath, oils,".to_owned()),
            ratings: Some("4,3,9,junk".to_owned()),
            ..empty_query()
        };
        apply_query(&mut filters, &mut sort, &query);

        assert_eq!(filters.categories.len(), 2);
        assert!(filters.categories.contains(&CategoryId::new("oils")));
        // Out-of-range and unparsable thresholds are dropped.
        assert_eq!(filters.ratings, BTreeSet::from([3, 4]));
    }

    #[test]
    fn unknown_sort_values_are_ignored() {
        let mut filters = FilterState::default();
        let mut sort = SortKey::Popularity;

        let query = CatalogQuery {
            sort: Some("cheapest".to_owned()),
            ..empty_query()
        };
        apply_query(&mut filters, &mut sort, &query);
        assert_eq!(sort, SortKey::Popularity);

        let query = CatalogQuery {
            sort: Some("price-desc".to_owned()),
            ..empty_query()
        };
        apply_query(&mut filters, &mut sort, &query);
        assert_eq!(sort, SortKey::PriceDesc);
    }

    #[test]
    fn price_field_hides_default_bounds() {
        assert_eq!(price_field(Decimal::ZERO, Decimal::ZERO), "");
        assert_eq!(price_field(Decimal::MAX, Decimal::MAX), "");
        assert_eq!(price_field(Decimal::from(25), Decimal::MAX), "25");
    }
}
