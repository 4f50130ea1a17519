//! Marketplace backend contract.
//!
//! The backend owns products and orders and is the authority on prices,
//! promo codes and who may do what. The storefront reaches it only through
//! [`Backend`]; reads are usually made through [`crate::query::QueryClient`]
//! so they can be cached.

use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

use crate::{
    orders::{ContactInfo, Order, OrderId, OrderItem},
    products::{ImageRef, Product, ProductDraft, ProductId},
    referrals::ReferralSummary,
    settings::MarketplaceSettings,
};

/// Errors returned by backend calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The requested record does not exist.
    #[error("{0} not found")]
    NotFound(String),

    /// The backend rejected the request data.
    #[error("{0}")]
    Validation(String),

    /// The caller lacks the identity or role required.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The call did not reach the backend or its reply was lost.
    #[error("Failed to reach the marketplace: {0}")]
    Transport(String),
}

/// Marketplace backend operations used by the storefront.
#[automock]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Full catalogue snapshot.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// A single product.
    async fn get_product(&self, product_id: ProductId) -> Result<Product, BackendError>;

    /// Place an order for the calling user.
    ///
    /// The backend recomputes the total and decides on its own whether
    /// `promo_code` earns a discount.
    async fn create_order(
        &self,
        items: Vec<OrderItem>,
        contact_info: ContactInfo,
        promo_code: Option<String>,
    ) -> Result<Order, BackendError>;

    /// Orders placed by the calling user.
    async fn list_my_orders(&self) -> Result<Vec<Order>, BackendError>;

    /// A single order belonging to the calling user.
    async fn get_order(&self, order_id: OrderId) -> Result<Order, BackendError>;

    /// Add a product to the catalogue (admin only).
    async fn create_product(&self, draft: ProductDraft) -> Result<Product, BackendError>;

    /// Replace a product's details (admin only).
    async fn update_product(
        &self,
        product_id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, BackendError>;

    /// Remove a product from the catalogue (admin only).
    async fn delete_product(&self, product_id: ProductId) -> Result<(), BackendError>;

    /// The caller's referral code, created on first request.
    async fn get_or_create_referral_code(&self) -> Result<String, BackendError>;

    /// Record that the caller was referred by the owner of `code`.
    async fn apply_referral_code(&self, code: String) -> Result<(), BackendError>;

    /// Referral activity for the caller's own code.
    async fn get_own_referral_summary(&self) -> Result<ReferralSummary, BackendError>;

    /// Storefront branding.
    async fn get_marketplace_settings(&self) -> Result<MarketplaceSettings, BackendError>;

    /// Rename the marketplace (admin only).
    async fn save_marketplace_name(&self, name: String) -> Result<(), BackendError>;

    /// Replace the header tagline (admin only).
    async fn update_tagline(&self, tagline: String) -> Result<(), BackendError>;

    /// Replace the header logo (admin only).
    async fn save_marketplace_logo(&self, logo: ImageRef) -> Result<(), BackendError>;
}
