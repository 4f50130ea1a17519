//! Promotions
//!
//! Client-side promo codes. A recognised code halves the order subtotal.
//!
//! The result is advisory only: the backend re-validates the code and computes
//! the authoritative total when the order is created.

use std::fmt;

/// Promo codes accepted for the half-price discount.
pub const VALID_PROMO_CODES: [&str; 12] = [
    "X7P9K2Q4", "L3M8Z1T6", "R5V2N9C7", "B8Q4Y6W1", "T2H7J5K9", "P9D3F8L2", "Z4X6C1V8", "N7M2A5S9",
    "K1R8E4T3", "W6Y9U2I5", "C3B7N1M8", "J8L4P6Q2",
];

/// A promo code that has been normalised and found in the allowlist.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PromoCode(String);

impl PromoCode {
    /// Normalise `code` and return it if it is on the allowlist.
    pub fn parse(code: &str) -> Option<Self> {
        let normalised = normalise(code);

        VALID_PROMO_CODES
            .contains(&normalised.as_str())
            .then_some(Self(normalised))
    }

    /// The normalised (trimmed, upper-case) code.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the code, returning the normalised string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PromoCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of applying an optional promo code to a subtotal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscountOutcome {
    /// Amount taken off the subtotal.
    pub discount_cents: u64,

    /// Subtotal minus discount.
    pub final_total_cents: u64,

    /// Whether the code was recognised.
    pub is_valid: bool,
}

fn normalise(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Check a candidate code against the allowlist, ignoring case and surrounding whitespace.
pub fn is_promo_code_valid(code: &str) -> bool {
    PromoCode::parse(code).is_some()
}

/// Apply `promo_code` to `subtotal_cents`.
///
/// A valid code discounts half the subtotal, rounded down to whole cents.
pub fn calculate_discount(subtotal_cents: u64, promo_code: Option<&str>) -> DiscountOutcome {
    let is_valid = promo_code.is_some_and(is_promo_code_valid);

    if !is_valid {
        return DiscountOutcome {
            discount_cents: 0,
            final_total_cents: subtotal_cents,
            is_valid: false,
        };
    }

    let discount_cents = subtotal_cents / 2;

    DiscountOutcome {
        discount_cents,
        final_total_cents: subtotal_cents - discount_cents,
        is_valid: true,
    }
}
