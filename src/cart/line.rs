//! Cart Lines

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::products::{ImageRef, Product, ProductId};

/// Errors raised when turning a product page selection into a cart line.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineSelectionError {
    /// No size was chosen.
    #[error("Please select a size")]
    MissingSize,

    /// No colour was chosen.
    #[error("Please select a color")]
    MissingColor,

    /// The chosen size is not offered for this product.
    #[error("Size {0} is not available for this product")]
    UnknownSize(String),

    /// The chosen colour is not offered for this product.
    #[error("Color {0} is not available for this product")]
    UnknownColor(String),
}

/// Product snapshot captured when it is added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Product identifier
    pub product_id: ProductId,

    /// Product title at the time it was added
    pub title: String,

    /// Unit price in cents at the time it was added
    #[serde(rename = "priceCents")]
    pub unit_price_cents: u64,

    /// Selected size
    pub size: String,

    /// Selected colour
    pub color: String,

    /// Product image
    #[serde(rename = "imageUrl", default)]
    pub image_ref: ImageRef,
}

impl LineItem {
    /// Build a line item from a catalogue product and the shopper's selection.
    ///
    /// # Errors
    ///
    /// Returns a [`LineSelectionError`] if the size or colour is blank or not
    /// offered for the product.
    pub fn from_product(
        product: &Product,
        size: &str,
        color: &str,
    ) -> Result<Self, LineSelectionError> {
        if size.trim().is_empty() {
            return Err(LineSelectionError::MissingSize);
        }

        if color.trim().is_empty() {
            return Err(LineSelectionError::MissingColor);
        }

        if !product.offers_size(size) {
            return Err(LineSelectionError::UnknownSize(size.to_string()));
        }

        if !product.offers_color(color) {
            return Err(LineSelectionError::UnknownColor(color.to_string()));
        }

        Ok(Self {
            product_id: product.product_id,
            title: product.title.clone(),
            unit_price_cents: product.price_cents,
            size: size.to_string(),
            color: color.to_string(),
            image_ref: product.image_ref.clone(),
        })
    }

    /// Whether this item is the (product, size, colour) combination given.
    pub fn is_variant(&self, product_id: ProductId, size: &str, color: &str) -> bool {
        self.product_id == product_id && self.size == size && self.color == color
    }
}

/// One row of the cart: a line item and how many of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    /// The product combination
    #[serde(flatten)]
    pub item: LineItem,

    /// Quantity, always at least one
    pub quantity: u32,
}

impl CartLine {
    /// Line total in cents.
    pub fn total_cents(&self) -> u64 {
        self.item
            .unit_price_cents
            .saturating_mul(u64::from(self.quantity))
    }

    /// Whether this line holds the (product, size, colour) combination given.
    pub fn is_variant(&self, product_id: ProductId, size: &str, color: &str) -> bool {
        self.item.is_variant(product_id, size, color)
    }

    fn same_variant(&self, other: &LineItem) -> bool {
        self.item
            .is_variant(other.product_id, &other.size, &other.color)
    }
}

/// Merge `quantity` units of `item` into `lines`.
///
/// An existing line for the same variant has its quantity increased; otherwise
/// a new line is appended.
pub(crate) fn merge_into(lines: &mut Vec<CartLine>, item: LineItem, quantity: u32) {
    if let Some(existing) = lines.iter_mut().find(|line| line.same_variant(&item)) {
        existing.quantity = existing.quantity.saturating_add(quantity);
        return;
    }

    lines.push(CartLine { item, quantity });
}
