//! Velour Core - Shared domain library.
//!
//! This crate provides the domain model used by the Velour storefront:
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, prices, and emails
//! - [`catalog`] - Product and category records, filter state, and the
//!   listing derivation pipeline
//! - [`cart`] - The shopping cart container with derived totals
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! HTTP clients, no async. Everything here can be constructed and tested
//! in isolation; the storefront binary owns all side effects.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod types;

pub use cart::{Cart, CartItem};
pub use catalog::{Category, FilterState, PriceRange, Product, SortKey, derive_listing};
pub use types::*;
