//! Product catalog: fixture store, remote provider client, and the
//! mapping boundary.
//!
//! # Architecture
//!
//! - Fixture data (products, categories, shipping methods) is loaded
//!   once at startup into a read-only [`ProductCatalog`]
//! - The optional [`CatalogClient`] talks to a remote provider API and
//!   caches responses in-memory via `moka` (5 minute TTL)
//! - Provider-shaped records cross into the normalized product shape in
//!   exactly one place, the [`provider`] module

mod client;
mod provider;
mod store;

pub use client::CatalogClient;
pub use store::{ProductCatalog, ShippingMethod};

use thiserror::Error;

/// Errors that can occur when talking to the catalog provider API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned a non-success status.
    #[error("Provider returned status {0}")]
    Status(u16),

    /// Provider endpoint URL could not be built.
    #[error("Invalid provider URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}
