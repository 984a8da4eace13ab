//! Home page handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use velour_core::{FilterState, SortKey, derive_listing};

use crate::filters;
use crate::routes::blog::PostView;
use crate::routes::products::ProductCardView;
use crate::state::AppState;

/// Number of featured products on the home page.
const FEATURED_COUNT: usize = 4;

/// Number of recent blog posts on the home page.
const RECENT_POSTS_COUNT: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured: Vec<ProductCardView>,
    pub posts: Vec<PostView>,
}

/// Display the home page: featured products and recent posts.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> HomeTemplate {
    let listing = derive_listing(
        state.catalog().products(),
        &FilterState::default(),
        SortKey::Relevance,
    );

    HomeTemplate {
        featured: listing.iter().take(FEATURED_COUNT).map(ProductCardView::from).collect(),
        posts: state
            .content()
            .recent_posts(RECENT_POSTS_COUNT, None)
            .into_iter()
            .map(PostView::from)
            .collect(),
    }
}
