//! The shopping cart container.
//!
//! One cart lives per browser session. Lines are keyed by
//! `(product_id, variant)`; adding an existing key increments its
//! quantity, updating sets an absolute quantity and removes the line
//! when it drops to zero or below.
//!
//! The cart itself never enforces stock limits - quantity caps are a
//! concern of the interaction point, not an invariant of the store.
//!
//! Totals come in two flavors, deliberately different:
//! - [`Cart::total_items`] counts raw line quantities without touching
//!   the catalog, so the badge stays stable even if a product is
//!   delisted mid-session.
//! - [`Cart::subtotal`] joins lines against the product collection and
//!   silently drops lines that no longer resolve.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::ProductId;

/// A single cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: ProductId,
    /// Always positive; a line at zero is removed instead.
    pub quantity: u32,
    /// Free-text qualifier distinguishing otherwise-identical lines.
    #[serde(default)]
    pub variant: Option<String>,
}

/// The session shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn position(&self, product_id: &ProductId, variant: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.product_id == *product_id && item.variant.as_deref() == variant)
    }

    /// Add `quantity` units, incrementing an existing line or inserting
    /// a new one. Adding zero units is a no-op.
    pub fn add(&mut self, product_id: ProductId, quantity: u32, variant: Option<String>) {
        if quantity == 0 {
            return;
        }
        match self.position(&product_id, variant.as_deref()) {
            Some(index) => {
                if let Some(item) = self.items.get_mut(index) {
                    item.quantity = item.quantity.saturating_add(quantity);
                }
            }
            None => self.items.push(CartItem {
                product_id,
                quantity,
                variant,
            }),
        }
    }

    /// Set an absolute quantity for a line, removing it when the result
    /// is zero or below. Updating an absent line with a positive
    /// quantity inserts it.
    pub fn update(&mut self, product_id: &ProductId, quantity: i64, variant: Option<&str>) {
        let Ok(quantity) = u32::try_from(quantity) else {
            // Negative: driven below zero by a decrement control.
            self.remove(product_id, variant);
            return;
        };
        if quantity == 0 {
            self.remove(product_id, variant);
            return;
        }
        match self.position(product_id, variant) {
            Some(index) => {
                if let Some(item) = self.items.get_mut(index) {
                    item.quantity = quantity;
                }
            }
            None => self.items.push(CartItem {
                product_id: product_id.clone(),
                quantity,
                variant: variant.map(str::to_owned),
            }),
        }
    }

    /// Remove a line entirely.
    pub fn remove(&mut self, product_id: &ProductId, variant: Option<&str>) {
        if let Some(index) = self.position(product_id, variant) {
            self.items.remove(index);
        }
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total quantity across all lines, counted over raw entries without
    /// resolving products against the catalog.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }

    /// Lines joined against the product collection. Lines whose product
    /// no longer resolves are dropped without error.
    pub fn resolved_lines<'a>(
        &'a self,
        products: &'a [Product],
    ) -> impl Iterator<Item = (&'a CartItem, &'a Product)> {
        self.items.iter().filter_map(|item| {
            products
                .iter()
                .find(|product| product.id == item.product_id)
                .map(|product| (item, product))
        })
    }

    /// Cart subtotal at effective prices over the resolvable lines.
    #[must_use]
    pub fn subtotal(&self, products: &[Product]) -> Decimal {
        self.resolved_lines(products)
            .map(|(item, product)| product.effective_price() * Decimal::from(item.quantity))
            .sum()
    }
}
