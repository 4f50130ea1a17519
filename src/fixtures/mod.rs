//! Fixtures
//!
//! YAML product catalogues and an in-process [`Backend`](crate::backend::Backend)
//! that serves them, used by the demo binary and the integration tests.

use std::{fs, path::Path};

use thiserror::Error;

use crate::{
    fixtures::products::ProductsFixture,
    products::{Product, ProductId},
};

pub mod backend;
pub mod products;

pub use backend::{Caller, FixtureBackend};

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Product priced in a currency other than the store's
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Product offers no sizes or no colours
    #[error("Product has no sizes or colours: {0}")]
    NoOptions(String),
}

/// Load a product catalogue from a YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any product is invalid.
pub fn load_catalogue(path: impl AsRef<Path>) -> Result<Vec<Product>, FixtureError> {
    let contents = fs::read_to_string(path)?;

    parse_catalogue(&contents)
}

/// Parse a product catalogue from YAML, ordered by product id.
///
/// # Errors
///
/// Returns an error if the YAML is malformed or any product is invalid.
pub fn parse_catalogue(yaml: &str) -> Result<Vec<Product>, FixtureError> {
    let fixture: ProductsFixture = serde_norway::from_str(yaml)?;

    let mut products = fixture
        .products
        .into_iter()
        .map(|(id, product)| product.into_product(ProductId(id)))
        .collect::<Result<Vec<_>, _>>()?;

    products.sort_by_key(|product| product.product_id);

    Ok(products)
}
