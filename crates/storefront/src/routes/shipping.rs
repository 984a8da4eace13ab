//! Shipping information page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::catalog::ShippingMethod;
use crate::filters;
use crate::state::AppState;

/// Shipping method display data.
#[derive(Clone)]
pub struct ShippingMethodView {
    pub name: String,
    pub eta: String,
    pub regions: String,
    pub price_rules: String,
}

impl From<&ShippingMethod> for ShippingMethodView {
    fn from(method: &ShippingMethod) -> Self {
        Self {
            name: method.name.clone(),
            eta: method.eta.clone(),
            regions: method.regions.join(", "),
            price_rules: method.price_rules.clone(),
        }
    }
}

/// Shipping page template.
#[derive(Template, WebTemplate)]
#[template(path = "shipping.html")]
pub struct ShippingTemplate {
    pub methods: Vec<ShippingMethodView>,
}

/// Display the shipping methods page.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> ShippingTemplate {
    ShippingTemplate {
        methods: state
            .catalog()
            .shipping_methods()
            .iter()
            .map(ShippingMethodView::from)
            .collect(),
    }
}
