//! Catalog filter state and ordering modes.
//!
//! One `FilterState` lives per browser session. It starts with every
//! predicate disabled, is mutated by the catalog page controls, and is
//! reset on explicit request - never persisted beyond the session.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

/// Inclusive bounds on the effective price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `price` falls inside the range, bounds included.
    #[must_use]
    pub fn contains(&self, price: Decimal) -> bool {
        self.min <= price && price <= self.max
    }

    /// Whether the range admits every representable price.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        self.min <= Decimal::ZERO && self.max == Decimal::MAX
    }
}

impl Default for PriceRange {
    /// The "no filter" range: admits every price.
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::MAX,
        }
    }
}

/// Active catalog filters.
///
/// All predicates are AND-combined by the derivation pipeline; the
/// default value disables every predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected category IDs; empty means no category restriction.
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
    #[serde(default)]
    pub price_range: PriceRange,
    /// Selected rating thresholds (1-5); empty means no restriction.
    #[serde(default)]
    pub ratings: BTreeSet<u8>,
    #[serde(default)]
    pub in_stock_only: bool,
    /// Free-text query matched against name and tags.
    #[serde(default)]
    pub query: String,
}

impl FilterState {
    /// Whether every predicate is disabled.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.categories.is_empty()
            && self.price_range.is_unbounded()
            && self.ratings.is_empty()
            && !self.in_stock_only
            && self.query.is_empty()
    }

    /// Clear every filter back to the defaults.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Catalog ordering modes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Featured items first, ties broken by view count.
    #[default]
    Relevance,
    PriceAsc,
    PriceDesc,
    Rating,
    Popularity,
    Newest,
}

impl SortKey {
    /// Stable string form, used in query params and the sort selector.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
            Self::Popularity => "popularity",
            Self::Newest => "newest",
        }
    }

    /// Parse the string form; unknown values map to `None`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "relevance" => Some(Self::Relevance),
            "price-asc" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "rating" => Some(Self::Rating),
            "popularity" => Some(Self::Popularity),
            "newest" => Some(Self::Newest),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_disables_every_predicate() {
        let state = FilterState::default();
        assert!(state.is_default());
        assert!(state.price_range.contains(Decimal::ZERO));
        assert!(state.price_range.contains(Decimal::from(1_000_000)));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = FilterState {
            in_stock_only: true,
            query: "oil".to_owned(),
            ..FilterState::default()
        };
        state.categories.insert(CategoryId::new("wellness"));
        assert!(!state.is_default());

        state.reset();
        assert!(state.is_default());
    }

    #[test]
    fn price_range_bounds_are_inclusive() {
        let range = PriceRange::new(Decimal::from(10), Decimal::from(20));
        assert!(range.contains(Decimal::from(10)));
        assert!(range.contains(Decimal::from(20)));
        assert!(!range.contains(Decimal::new(2001, 2)));
    }

    #[test]
    fn sort_key_round_trips_through_strings() {
        for key in [
            SortKey::Relevance,
            SortKey::PriceAsc,
            SortKey::PriceDesc,
            SortKey::Rating,
            SortKey::Popularity,
            SortKey::Newest,
        ] {
            assert_eq!(SortKey::parse(key.as_str()), Some(key));
        }
        assert_eq!(SortKey::parse("cheapest"), None);
    }

    #[test]
    fn sort_key_serde_matches_as_str() {
        let json = serde_json::to_string(&SortKey::PriceAsc).expect("serializable");
        assert_eq!(json, "\"price-asc\"");
    }
}
