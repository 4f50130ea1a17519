//! Marketplace settings
//!
//! Storefront branding shown in the header. Blank values fall back to the
//! built-in branding.

use serde::{Deserialize, Serialize};

use crate::products::ImageRef;

/// Name shown when none has been saved.
pub const DEFAULT_DISPLAY_NAME: &str = "AMERICAN PRINTERS";

/// Tagline shown when none has been saved.
pub const DEFAULT_TAGLINE: &str = "Unique printers, legend stop.";

/// Logo shown when none has been saved.
pub const DEFAULT_LOGO_URL: &str = "/assets/generated/american-printers-logo.dim_512x512.png";

/// Branding as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketplaceSettings {
    /// Marketplace name
    pub display_name: String,

    /// Short line under the name
    pub tagline: String,

    /// Logo image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<ImageRef>,
}

impl MarketplaceSettings {
    /// Name for the header.
    pub fn header_name(&self) -> &str {
        non_blank(&self.display_name).unwrap_or(DEFAULT_DISPLAY_NAME)
    }

    /// Tagline for the header.
    pub fn header_tagline(&self) -> &str {
        non_blank(&self.tagline).unwrap_or(DEFAULT_TAGLINE)
    }

    /// Logo URL for the header.
    pub fn logo_url(&self) -> &str {
        self.logo
            .as_ref()
            .filter(|logo| !logo.is_empty())
            .map_or(DEFAULT_LOGO_URL, ImageRef::display_url)
    }
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();

    (!trimmed.is_empty()).then_some(trimmed)
}
