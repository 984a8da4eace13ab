//! Simulated checkout.
//!
//! There is no payment gateway. Processing waits the configured delay,
//! reports success unconditionally, clears the cart, and sends the
//! buyer home. The delay suspends only this request's continuation; the
//! rest of the interface stays responsive.

use std::time::Duration;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use uuid::Uuid;

use velour_core::Email;

use crate::error::Result;
use crate::filters;
use crate::models::session as session_state;
use crate::routes::cart::{CartView, build_cart_view};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    /// One of `delivery`, `pickup`, `arrange`.
    pub shipping_method: String,
}

/// Validate the checkout form.
///
/// Delivery orders need a full address; pickup and arranged handover do
/// not. Returns the parsed email on success, a user-facing message on
/// failure.
fn validate_form(form: &CheckoutForm) -> std::result::Result<Email, String> {
    let email = Email::parse(form.email.trim()).map_err(|e| e.to_string())?;

    if form.shipping_method == "delivery" {
        let required = [
            ("address", &form.address),
            ("city", &form.city),
            ("postal code", &form.postal_code),
        ];
        for (label, value) in required {
            if value.as_deref().map(str::trim).unwrap_or_default().is_empty() {
                return Err(format!("Please provide your {label} for delivery"));
            }
        }
    }

    Ok(email)
}

// =============================================================================
// Payment Simulation
// =============================================================================

/// Outcome of the simulated payment.
struct PaymentReceipt {
    order_ref: Uuid,
}

/// Stand-in for a payment gateway: waits the processing delay, then
/// reports success. No failure path, no timeout, no idempotency key.
async fn simulate_payment(delay: Duration) -> PaymentReceipt {
    tokio::time::sleep(delay).await;
    PaymentReceipt {
        order_ref: Uuid::new_v4(),
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart: CartView,
    pub error: Option<String>,
}

/// Order-complete page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/complete.html")]
pub struct CheckoutCompleteTemplate {
    pub order_ref: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the checkout page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let cart = session_state::load_cart(&session).await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let promo = session_state::applied_promo(&session).await;
    CheckoutShowTemplate {
        cart: build_cart_view(&state, &cart, promo),
        error: None,
    }
    .into_response()
}

/// Process the simulated payment.
///
/// Validation failures re-render the checkout page with a notice and
/// the form left in place. A valid submission always succeeds after the
/// configured delay; the cart and promo are cleared and the completion
/// page navigates home.
#[instrument(skip(state, session, form))]
pub async fn process(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let cart = session_state::load_cart(&session).await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let email = match validate_form(&form) {
        Ok(email) => email,
        Err(message) => {
            let promo = session_state::applied_promo(&session).await;
            return Ok(CheckoutShowTemplate {
                cart: build_cart_view(&state, &cart, promo),
                error: Some(message),
            }
            .into_response());
        }
    };

    let receipt = simulate_payment(state.config().checkout.delay).await;
    tracing::info!(
        order_ref = %receipt.order_ref,
        email = %email,
        items = cart.total_items(),
        "Simulated payment accepted"
    );

    let mut cart = cart;
    cart.clear();
    session_state::save_cart(&session, &cart).await?;
    session_state::clear_promo(&session).await?;

    Ok(CheckoutCompleteTemplate {
        order_ref: receipt.order_ref.to_string(),
    }
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery_form() -> CheckoutForm {
        CheckoutForm {
            email: "ana@example.com".to_owned(),
            phone: None,
            address: Some("123 Main St".to_owned()),
            city: Some("Springfield".to_owned()),
            postal_code: Some("12345".to_owned()),
            shipping_method: "delivery".to_owned(),
        }
    }

    #[test]
    fn complete_delivery_form_validates() {
        assert!(validate_form(&delivery_form()).is_ok());
    }

    #[test]
    fn delivery_requires_a_full_address() {
        let form = CheckoutForm {
            city: Some("  ".to_owned()),
            ..delivery_form()
        };
        let err = validate_form(&form).expect_err("blank city must fail");
        assert!(err.contains("city"));
    }

    #[test]
    fn pickup_needs_no_address() {
        let form = CheckoutForm {
            address: None,
            city: None,
            postal_code: None,
            shipping_method: "pickup".to_owned(),
            ..delivery_form()
        };
        assert!(validate_form(&form).is_ok());
    }

    #[test]
    fn invalid_email_is_rejected() {
        let form = CheckoutForm {
            email: "not-an-email".to_owned(),
            ..delivery_form()
        };
        assert!(validate_form(&form).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn payment_simulation_waits_the_full_delay() {
        let delay = Duration::from_secs(2);
        let start = tokio::time::Instant::now();
        let receipt = simulate_payment(delay).await;
        assert!(start.elapsed() >= delay);
        assert!(!receipt.order_ref.is_nil());
    }
}
