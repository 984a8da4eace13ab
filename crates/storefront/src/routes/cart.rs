//! Cart route handlers.
//!
//! Cart mutations use HTMX for dynamic updates without full page
//! reloads. The cart lives in the session: every mutation loads it,
//! applies the change, and writes it back. Lines whose product no
//! longer resolves against the catalog are dropped from display and
//! money math; the badge still counts raw quantities.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use velour_core::{Cart, ProductId, display_usd};

use crate::config::CheckoutConfig;
use crate::error::Result;
use crate::filters;
use crate::models::session as session_state;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub slug: String,
    pub name: String,
    pub variant: Option<String>,
    pub quantity: u32,
    pub image: Option<String>,
    pub price: String,
    pub line_total: String,
    /// Struck-through pre-sale line total when the product is on sale.
    pub compare_at_line: Option<String>,
}

/// Order money summary shared by the cart and checkout pages.
#[derive(Clone)]
pub struct SummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub discount: Option<String>,
    pub total: String,
    /// Amount still missing for free shipping.
    pub free_shipping_gap: Option<String>,
    pub promo_applied: Option<String>,
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub summary: SummaryView,
    pub item_count: u32,
}

impl CartView {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Money Math
// =============================================================================

/// Raw money breakdown for an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub discount: Decimal,
    pub total: Decimal,
}

/// Compute the order totals.
///
/// Shipping is free at the threshold and flat below it; an empty cart
/// ships nothing. The promo discount is a percentage of the subtotal,
/// rounded to cents.
#[must_use]
pub fn order_totals(subtotal: Decimal, promo_applied: bool, checkout: &CheckoutConfig) -> OrderTotals {
    let shipping = if subtotal.is_zero() || subtotal >= checkout.free_shipping_threshold {
        Decimal::ZERO
    } else {
        checkout.flat_shipping_rate
    };

    let discount = if promo_applied {
        (subtotal * checkout.promo_percent / Decimal::ONE_HUNDRED).round_dp(2)
    } else {
        Decimal::ZERO
    };

    OrderTotals {
        subtotal,
        shipping,
        discount,
        total: subtotal + shipping - discount,
    }
}

/// Build the full cart view for a session cart.
pub fn build_cart_view(state: &AppState, cart: &Cart, promo: Option<String>) -> CartView {
    let products = state.catalog().products();

    let items: Vec<CartItemView> = cart
        .resolved_lines(products)
        .map(|(item, product)| {
            let unit = product.effective_price();
            let quantity = Decimal::from(item.quantity);
            CartItemView {
                product_id: product.id.to_string(),
                slug: product.slug.clone(),
                name: product.name.clone(),
                variant: item.variant.clone(),
                quantity: item.quantity,
                image: product.images.first().cloned(),
                price: display_usd(unit),
                line_total: display_usd(unit * quantity),
                compare_at_line: product
                    .sale_price
                    .map(|_| display_usd(product.price * quantity)),
            }
        })
        .collect();

    let subtotal = cart.subtotal(products);
    let checkout = &state.config().checkout;
    let totals = order_totals(subtotal, promo.is_some(), checkout);

    let free_shipping_gap = (!subtotal.is_zero() && subtotal < checkout.free_shipping_threshold)
        .then(|| display_usd(checkout.free_shipping_threshold - subtotal));

    CartView {
        items,
        summary: SummaryView {
            subtotal: display_usd(totals.subtotal),
            shipping: if totals.shipping.is_zero() {
                "Free".to_owned()
            } else {
                display_usd(totals.shipping)
            },
            discount: (!totals.discount.is_zero()).then(|| format!("-{}", display_usd(totals.discount))),
            total: display_usd(totals.total),
            free_shipping_gap,
            promo_applied: promo,
        },
        item_count: cart.total_items(),
    }
}

// =============================================================================
// Form Types
// =============================================================================

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
    pub variant: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: i64,
    pub variant: Option<String>,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
    pub variant: Option<String>,
}

/// Promo code form data.
#[derive(Debug, Deserialize)]
pub struct PromoForm {
    pub code: String,
}

/// Empty form fields arrive as `Some("")`; treat them as absent.
fn normalize_variant(variant: Option<String>) -> Option<String> {
    variant.filter(|v| !v.trim().is_empty())
}

// =============================================================================
// Templates
// =============================================================================

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub promo_error: Option<String>,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> CartShowTemplate {
    let cart = session_state::load_cart(&session).await;
    let promo = session_state::applied_promo(&session).await;

    CartShowTemplate {
        cart: build_cart_view(&state, &cart, promo),
        promo_error: None,
    }
}

/// Add an item to the cart (HTMX).
///
/// Returns the cart count badge with an `HX-Trigger` so other fragments
/// can refresh.
#[instrument(skip(session))]
pub async fn add(session: Session, Form(form): Form<AddToCartForm>) -> Result<Response> {
    let mut cart = session_state::load_cart(&session).await;
    cart.add(
        ProductId::new(form.product_id),
        form.quantity.unwrap_or(1),
        normalize_variant(form.variant),
    );
    session_state::save_cart(&session, &cart).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate {
            count: cart.total_items(),
        },
    )
        .into_response())
}

/// Set a cart line's quantity (HTMX).
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let mut cart = session_state::load_cart(&session).await;
    let variant = normalize_variant(form.variant);
    cart.update(
        &ProductId::new(form.product_id),
        form.quantity,
        variant.as_deref(),
    );
    session_state::save_cart(&session, &cart).await?;

    let promo = session_state::applied_promo(&session).await;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: build_cart_view(&state, &cart, promo),
        },
    )
        .into_response())
}

/// Remove a cart line (HTMX).
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = session_state::load_cart(&session).await;
    let variant = normalize_variant(form.variant);
    cart.remove(&ProductId::new(form.product_id), variant.as_deref());
    session_state::save_cart(&session, &cart).await?;

    let promo = session_state::applied_promo(&session).await;
    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: build_cart_view(&state, &cart, promo),
        },
    )
        .into_response())
}

/// Empty the cart (HTMX).
#[instrument(skip(state, session))]
pub async fn clear(State(state): State<AppState>, session: Session) -> Result<Response> {
    let mut cart = session_state::load_cart(&session).await;
    cart.clear();
    session_state::save_cart(&session, &cart).await?;
    session_state::clear_promo(&session).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: build_cart_view(&state, &cart, None),
        },
    )
        .into_response())
}

/// Get the cart count badge (HTMX).
#[instrument(skip(session))]
pub async fn count(session: Session) -> CartCountTemplate {
    let cart = session_state::load_cart(&session).await;
    CartCountTemplate {
        count: cart.total_items(),
    }
}

/// Apply a promo code.
///
/// An invalid code re-renders the cart page with a blocking notice and
/// the form left in place.
#[instrument(skip(state, session))]
pub async fn apply_promo(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PromoForm>,
) -> Result<Response> {
    let code = form.code.trim().to_uppercase();

    if code == state.config().checkout.promo_code {
        session_state::save_promo(&session, &code).await?;
        return Ok(Redirect::to("/cart").into_response());
    }

    let cart = session_state::load_cart(&session).await;
    let promo = session_state::applied_promo(&session).await;
    Ok(CartShowTemplate {
        cart: build_cart_view(&state, &cart, promo),
        promo_error: Some(format!("Promo code \"{}\" is not valid", form.code.trim())),
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn checkout_config() -> CheckoutConfig {
        CheckoutConfig {
            delay: Duration::from_millis(2000),
            free_shipping_threshold: Decimal::from(50),
            flat_shipping_rate: Decimal::new(899, 2),
            promo_code: "WELCOME10".to_owned(),
            promo_percent: Decimal::from(10),
        }
    }

    #[test]
    fn shipping_is_flat_below_the_threshold() {
        let totals = order_totals(Decimal::from(30), false, &checkout_config());
        assert_eq!(totals.shipping, Decimal::new(899, 2));
        assert_eq!(totals.total, Decimal::new(3899, 2));
    }

    #[test]
    fn shipping_is_free_at_the_threshold() {
        let totals = order_totals(Decimal::from(50), false, &checkout_config());
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(50));
    }

    #[test]
    fn empty_cart_ships_nothing() {
        let totals = order_totals(Decimal::ZERO, false, &checkout_config());
        assert_eq!(totals.shipping, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::ZERO);
    }

    #[test]
    fn promo_discounts_a_percentage_of_the_subtotal() {
        let totals = order_totals(Decimal::from(60), true, &checkout_config());
        assert_eq!(totals.discount, Decimal::from(6));
        assert_eq!(totals.total, Decimal::from(54));
    }

    #[test]
    fn promo_discount_rounds_to_cents() {
        let totals = order_totals(Decimal::new(3333, 2), true, &checkout_config());
        assert_eq!(totals.discount, Decimal::new(333, 2));
    }

    #[test]
    fn blank_variants_normalize_to_none() {
        assert_eq!(normalize_variant(None), None);
        assert_eq!(normalize_variant(Some(String::new())), None);
        assert_eq!(normalize_variant(Some("  ".to_owned())), None);
        assert_eq!(
            normalize_variant(Some("Rose".to_owned())),
            Some("Rose".to_owned())
        );
    }
}
