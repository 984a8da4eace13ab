//! Price display helpers.
//!
//! The catalog is single-currency; prices are plain [`Decimal`] amounts
//! on the product records and only pick up a currency symbol at the
//! display boundary.

use rust_decimal::Decimal;

/// Format a decimal amount as a display price, e.g. `$19.99`.
///
/// Always renders two fraction digits.
#[must_use]
pub fn display_usd(amount: Decimal) -> String {
    format!("${amount:.2}")
}
