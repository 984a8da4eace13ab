//! Catalog domain: product records, filter state, and listing derivation.

pub mod filter;
pub mod pipeline;
pub mod product;

pub use filter::{FilterState, PriceRange, SortKey};
pub use pipeline::derive_listing;
pub use product::{Category, Product};
