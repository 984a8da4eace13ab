//! Session-stored state.
//!
//! Everything mutable in the storefront lives in the cookie session:
//! the cart, the catalog filter state, the active sort, the applied
//! promo code, and the signed-in profile. This module owns the key
//! namespace and the typed load/save helpers. Loads swallow store
//! errors and fall back to defaults - a broken session reads as a fresh
//! one; saves surface their errors to the caller.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use uuid::Uuid;

use velour_core::{Cart, Email, FilterState, SortKey};

/// Session-stored user identity.
///
/// Login mutates this state only - there is no account backend, so the
/// identity lives and dies with the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: Email,
    pub name: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the catalog filter state.
    pub const FILTERS: &str = "filters";

    /// Key for the catalog sort key.
    pub const SORT: &str = "sort";

    /// Key for the applied promo code.
    pub const PROMO: &str = "promo";
}

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

// =============================================================================
// Cart
// =============================================================================

/// Get the session cart, or an empty one.
pub async fn load_cart(session: &Session) -> Cart {
    session
        .get::<Cart>(keys::CART)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the session cart.
pub async fn save_cart(session: &Session, cart: &Cart) -> SessionResult<()> {
    session.insert(keys::CART, cart).await
}

// =============================================================================
// Catalog filters
// =============================================================================

/// Get the session filter state, or the no-filter default.
pub async fn load_filters(session: &Session) -> FilterState {
    session
        .get::<FilterState>(keys::FILTERS)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the session filter state.
pub async fn save_filters(session: &Session, filters: &FilterState) -> SessionResult<()> {
    session.insert(keys::FILTERS, filters).await
}

/// Get the session sort key, or the default ordering.
pub async fn load_sort(session: &Session) -> SortKey {
    session
        .get::<SortKey>(keys::SORT)
        .await
        .ok()
        .flatten()
        .unwrap_or_default()
}

/// Store the session sort key.
pub async fn save_sort(session: &Session, sort: SortKey) -> SessionResult<()> {
    session.insert(keys::SORT, &sort).await
}

// =============================================================================
// Promo code
// =============================================================================

/// The promo code applied in this session, if any.
pub async fn applied_promo(session: &Session) -> Option<String> {
    session.get::<String>(keys::PROMO).await.ok().flatten()
}

/// Record an applied promo code.
pub async fn save_promo(session: &Session, code: &str) -> SessionResult<()> {
    session.insert(keys::PROMO, code).await
}

/// Drop the applied promo code.
pub async fn clear_promo(session: &Session) -> SessionResult<()> {
    session.remove::<String>(keys::PROMO).await.map(|_| ())
}

// =============================================================================
// Authentication
// =============================================================================

/// The signed-in user, if any.
pub async fn current_user(session: &Session) -> Option<CurrentUser> {
    session
        .get::<CurrentUser>(keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
}

/// Record a signed-in user.
pub async fn set_current_user(session: &Session, user: &CurrentUser) -> SessionResult<()> {
    session.insert(keys::CURRENT_USER, user).await
}

/// Sign the user out.
pub async fn clear_current_user(session: &Session) -> SessionResult<()> {
    session
        .remove::<CurrentUser>(keys::CURRENT_USER)
        .await
        .map(|_| ())
}
