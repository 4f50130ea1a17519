//! Product Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::iso::{self, Currency};
use serde::Deserialize;

use crate::{
    fixtures::FixtureError,
    money::CURRENCY,
    products::{ImageRef, Options, Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<u32, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product title
    pub title: String,

    /// Product description
    #[serde(default)]
    pub description: String,

    /// Product price (e.g., "499.00 INR")
    pub price: String,

    /// Offered sizes
    pub sizes: Options,

    /// Offered colours
    pub colors: Options,

    /// Direct image URL
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductFixture {
    /// Build the catalogue product with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the price cannot be parsed, is not in the store
    /// currency, or the product offers no sizes or colours.
    pub fn into_product(self, product_id: ProductId) -> Result<Product, FixtureError> {
        let (price_cents, currency) = parse_price(&self.price)?;

        if currency != CURRENCY {
            return Err(FixtureError::CurrencyMismatch(
                CURRENCY.iso_alpha_code.to_string(),
                currency.iso_alpha_code.to_string(),
            ));
        }

        if self.sizes.is_empty() || self.colors.is_empty() {
            return Err(FixtureError::NoOptions(self.title));
        }

        Ok(Product {
            product_id,
            title: self.title,
            description: self.description,
            price_cents,
            sizes: self.sizes,
            colors: self.colors,
            image_ref: self.image.map(ImageRef::from_url).unwrap_or_default(),
        })
    }
}

/// Parse price string (e.g., "499.00 INR") into minor units and currency
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount is negative or not a number, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(u64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    let [amount, currency_code] = parts.as_slice() else {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_u64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = iso::find(currency_code)
        .ok_or_else(|| FixtureError::UnknownCurrency((*currency_code).to_string()))?;

    Ok((minor_units, currency))
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{INR, USD};
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    fn fixture(price: &str) -> ProductFixture {
        ProductFixture {
            title: "Logo Tee".to_string(),
            description: String::new(),
            price: price.to_string(),
            sizes: smallvec!["M".to_string()],
            colors: smallvec!["Black".to_string()],
            image: None,
        }
    }

    #[test]
    fn parse_price_reads_rupees() -> TestResult {
        let (minor, currency) = parse_price("499.50 INR")?;

        assert_eq!(minor, 49_950);
        assert_eq!(currency, INR);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("499INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_negative_amounts() {
        let result = parse_price("-1.00 INR");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_price_accepts_other_known_currencies() -> TestResult {
        let (minor, currency) = parse_price("1.00 USD")?;

        assert_eq!(minor, 100);
        assert_eq!(currency, USD);

        Ok(())
    }

    #[test]
    fn fixture_without_image_uses_placeholder() -> TestResult {
        let product = fixture("299.00 INR").into_product(ProductId(7))?;

        assert_eq!(product.product_id, ProductId(7));
        assert_eq!(product.price_cents, 29_900);
        assert!(product.image_ref.is_empty());

        Ok(())
    }

    #[test]
    fn fixture_in_foreign_currency_is_rejected() {
        let result = fixture("10.00 USD").into_product(ProductId(1));

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_, found)) if found == "USD"));
    }

    #[test]
    fn fixture_without_sizes_is_rejected() {
        let mut fixture = fixture("10.00 INR");
        fixture.sizes.clear();

        assert!(matches!(
            fixture.into_product(ProductId(1)),
            Err(FixtureError::NoOptions(title)) if title == "Logo Tee"
        ));
    }
}
