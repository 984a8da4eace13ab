//! Category route handlers.
//!
//! A category page lists the products carrying that category. When a
//! remote provider is configured its listing endpoint is used; a failed
//! fetch degrades to an empty grid rather than an error page. Without a
//! provider the listing comes from the local catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, State};
use tracing::instrument;

use velour_core::{Category, FilterState, SortKey, derive_listing};

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Category display data for templates.
#[derive(Clone)]
pub struct CategoryCardView {
    pub name: String,
    pub slug: String,
    pub count: usize,
}

/// Category listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesIndexTemplate {
    pub categories: Vec<CategoryCardView>,
}

/// Category detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryShowTemplate {
    pub name: String,
    pub products: Vec<ProductCardView>,
}

/// Display all categories.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> CategoriesIndexTemplate {
    let categories = state
        .catalog()
        .categories()
        .iter()
        .map(|category| CategoryCardView {
            name: category.name.clone(),
            slug: category.slug.clone(),
            count: state.catalog().count_in_category(&category.id),
        })
        .collect();

    CategoriesIndexTemplate { categories }
}

/// Display the products in one category.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<CategoryShowTemplate> {
    let category: &Category = state
        .catalog()
        .categories()
        .iter()
        .find(|c| c.slug == slug)
        .ok_or_else(|| AppError::NotFound(format!("category {slug}")))?;

    let products = match state.remote() {
        Some(client) => match client.products_by_category(&category.id).await {
            Ok(products) => products,
            Err(e) => {
                // Degrade to an empty grid; the page itself still renders.
                tracing::warn!("Remote category fetch failed for {slug}: {e}");
                Vec::new()
            }
        },
        None => {
            let mut listing_filters = FilterState::default();
            listing_filters.categories.insert(category.id.clone());
            derive_listing(
                state.catalog().products(),
                &listing_filters,
                SortKey::Relevance,
            )
        }
    };

    Ok(CategoryShowTemplate {
        name: category.name.clone(),
        products: products.iter().map(ProductCardView::from).collect(),
    })
}
