//! Storefront Config

use std::path::PathBuf;

use clap::Args;
use jiff::SignedDuration;

use crate::query::DEFAULT_STALE_SECONDS;

/// Storefront session settings.
#[derive(Debug, Args)]
pub struct StorefrontArgs {
    /// JSON file backing session storage; in-memory when unset
    #[arg(long, env = "TEEMARKET_SESSION_FILE")]
    pub session_file: Option<PathBuf>,

    /// YAML product catalogue served by the fixture backend
    #[arg(long, env = "TEEMARKET_FIXTURES", default_value = "fixtures/catalogue.yml")]
    pub fixtures: PathBuf,

    /// Promo code to enter at checkout
    #[arg(long, env = "TEEMARKET_PROMO_CODE")]
    pub promo_code: Option<String>,

    /// Seconds before cached query results are refetched
    #[arg(long, env = "TEEMARKET_CACHE_STALE_SECONDS", default_value_t = DEFAULT_STALE_SECONDS)]
    pub cache_stale_seconds: i64,
}

impl StorefrontArgs {
    /// Cache freshness window; negative values are treated as zero.
    #[must_use]
    pub fn stale_time(&self) -> SignedDuration {
        SignedDuration::from_secs(self.cache_stale_seconds.max(0))
    }
}
