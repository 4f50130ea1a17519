//! Products

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Image shown when a product has no image of its own.
pub const PLACEHOLDER_IMAGE_URL: &str = "/assets/generated/product-placeholder.dim_800x800.png";

/// Backend-assigned product identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Reference to an externally hosted product image.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    /// Wrap a direct image URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// URL to display, falling back to the placeholder when no image is set.
    pub fn display_url(&self) -> &str {
        if self.0.trim().is_empty() {
            PLACEHOLDER_IMAGE_URL
        } else {
            &self.0
        }
    }

    /// Whether an image has been set.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// Sizes or colours offered for a product.
pub type Options = SmallVec<[String; 6]>;

/// Catalogue product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product identifier
    pub product_id: ProductId,

    /// Product title
    pub title: String,

    /// Product description
    pub description: String,

    /// Unit price in cents
    pub price_cents: u64,

    /// Offered sizes
    pub sizes: Options,

    /// Offered colours
    pub colors: Options,

    /// Product image
    pub image_ref: ImageRef,
}

impl Product {
    /// Whether `size` is one of the offered sizes.
    pub fn offers_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|offered| offered == size)
    }

    /// Whether `color` is one of the offered colours.
    pub fn offers_color(&self, color: &str) -> bool {
        self.colors.iter().any(|offered| offered == color)
    }
}

/// Product details sent when creating or editing a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Product title
    pub title: String,

    /// Product description
    pub description: String,

    /// Unit price in cents
    pub price_cents: u64,

    /// Offered sizes
    pub sizes: Options,

    /// Offered colours
    pub colors: Options,

    /// Product image
    pub image_ref: ImageRef,
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;

    use super::*;

    fn tee() -> Product {
        Product {
            product_id: ProductId(1),
            title: "Logo Tee".to_string(),
            description: "Organic cotton".to_string(),
            price_cents: 49_900,
            sizes: smallvec!["S".to_string(), "M".to_string()],
            colors: smallvec!["Red".to_string()],
            image_ref: ImageRef::default(),
        }
    }

    #[test]
    fn empty_image_falls_back_to_placeholder() {
        assert_eq!(ImageRef::default().display_url(), PLACEHOLDER_IMAGE_URL);
        assert_eq!(ImageRef::from_url("  ").display_url(), PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn image_url_is_used_when_present() {
        let image = ImageRef::from_url("https://cdn.example/tee.jpg");

        assert_eq!(image.display_url(), "https://cdn.example/tee.jpg");
        assert!(!image.is_empty());
    }

    #[test]
    fn offered_options_are_matched_exactly() {
        let product = tee();

        assert!(product.offers_size("M"));
        assert!(!product.offers_size("m"));
        assert!(product.offers_color("Red"));
        assert!(!product.offers_color("Blue"));
    }
}
