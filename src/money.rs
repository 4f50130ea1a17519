//! Money

use rusty_money::{
    Money,
    iso::{Currency, INR},
};

/// Storefront currency.
pub const CURRENCY: &Currency = INR;

/// Convert an amount in cents into a [`Money`] value in the storefront currency.
///
/// Amounts beyond `i64::MAX` saturate.
pub fn cents_to_money(cents: u64) -> Money<'static, Currency> {
    Money::from_minor(i64::try_from(cents).unwrap_or(i64::MAX), CURRENCY)
}

/// Format cents for display, e.g. `12345` as `₹123.45`.
pub fn format_price(cents: u64) -> String {
    let money = cents_to_money(cents);

    format!("{}{:.2}", CURRENCY.symbol, money.amount())
}

/// Format a discount for display, e.g. `500` as `-₹5.00`.
pub fn format_discount(cents: u64) -> String {
    format!("-{}", format_price(cents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_price_uses_two_decimal_places() {
        assert_eq!(format_price(12_345), "₹123.45");
        assert_eq!(format_price(50_00), "₹50.00");
        assert_eq!(format_price(7), "₹0.07");
    }

    #[test]
    fn format_price_zero() {
        assert_eq!(format_price(0), "₹0.00");
    }

    #[test]
    fn format_discount_is_negative() {
        assert_eq!(format_discount(499), "-₹4.99");
    }

    #[test]
    fn cents_to_money_keeps_minor_units() {
        assert_eq!(cents_to_money(999).to_minor_units(), 999);
    }
}
