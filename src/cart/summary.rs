//! Cart Summary

use crate::money::format_price;

/// Flat shipping charge applied to any non-empty cart (₹50).
pub const FLAT_SHIPPING_CENTS: u64 = 50_00;

/// Totals shown on the cart page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Sum of line totals
    pub subtotal_cents: u64,

    /// Shipping charge
    pub shipping_cents: u64,

    /// Subtotal plus shipping
    pub total_cents: u64,
}

impl CartSummary {
    /// Summarise a cart with the given subtotal.
    pub fn for_subtotal(subtotal_cents: u64) -> Self {
        let shipping_cents = if subtotal_cents > 0 {
            FLAT_SHIPPING_CENTS
        } else {
            0
        };

        Self {
            subtotal_cents,
            shipping_cents,
            total_cents: subtotal_cents.saturating_add(shipping_cents),
        }
    }

    /// Rows of (label, formatted amount) for display.
    pub fn rows(&self) -> [(&'static str, String); 3] {
        [
            ("Subtotal", format_price(self.subtotal_cents)),
            ("Shipping", format_price(self.shipping_cents)),
            ("Total", format_price(self.total_cents)),
        ]
    }
}
