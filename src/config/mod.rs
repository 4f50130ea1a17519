//! Storefront configuration

use clap::Parser;

use crate::config::{observability::LoggingConfig, storefront::StorefrontArgs};

pub mod observability;
pub mod storefront;

/// Teemarket storefront configuration
#[derive(Debug, Parser)]
#[command(name = "teemarket", about = "Teemarket storefront session", long_about = None)]
pub struct StorefrontConfig {
    /// Session, catalogue and cache settings.
    #[command(flatten)]
    pub storefront: StorefrontArgs,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl StorefrontConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}
