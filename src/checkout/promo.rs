//! Promo code entry

use crate::promotions::PromoCode;

/// Message shown when a typed promo code is not recognised.
pub const INVALID_PROMO_MESSAGE: &str = "Invalid promo code. Please check and try again.";

/// The promo code input on the checkout page.
///
/// Typing clears any previous verdict; the code is checked when the input
/// loses focus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoEntry {
    input: String,
    applied: Option<PromoCode>,
    error: Option<&'static str>,
}

impl PromoEntry {
    /// Replace the typed text.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        self.applied = None;
        self.error = None;
    }

    /// Check the typed text against the allowlist.
    ///
    /// Blank input clears both the applied code and the error.
    pub fn blur(&mut self) {
        if self.input.trim().is_empty() {
            self.applied = None;
            self.error = None;
            return;
        }

        self.applied = PromoCode::parse(&self.input);
        self.error = self.applied.is_none().then_some(INVALID_PROMO_MESSAGE);
    }

    /// The typed text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// The code that passed the last check, if any.
    pub fn applied(&self) -> Option<&PromoCode> {
        self.applied.as_ref()
    }

    /// The error from the last check, if any.
    pub fn error(&self) -> Option<&'static str> {
        self.error
    }

    /// The code to send with an order: the one that passed the last check.
    ///
    /// Text typed since then is not sent, so the order matches the summary.
    pub fn code_for_order(&self) -> Option<PromoCode> {
        self.applied.clone()
    }
}
