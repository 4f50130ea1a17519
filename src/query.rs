//! Query client
//!
//! Cache-backed access to the [`Backend`]. Reads are served from the cache
//! while they are younger than the stale time; successful mutations
//! invalidate the reads they affect so the next read goes to the backend.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use rustc_hash::FxHashMap;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    backend::{Backend, BackendError},
    orders::{ContactInfo, Order, OrderId, OrderItem},
    products::{ImageRef, Product, ProductDraft, ProductId},
    referrals::{ReferralError, ReferralSummary},
    settings::MarketplaceSettings,
};

/// Default freshness window for cached reads, in seconds.
pub const DEFAULT_STALE_SECONDS: i64 = 60;

/// Identifies a cached read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    /// The full catalogue
    Products,

    /// One product
    Product(ProductId),

    /// The caller's orders
    MyOrders,

    /// One order
    Order(OrderId),

    /// The caller's referral code
    ReferralCode,

    /// The caller's referral activity
    ReferralSummary,

    /// Storefront branding
    MarketplaceSettings,
}

#[derive(Debug, Clone)]
enum CachedData {
    Products(Vec<Product>),
    Product(Product),
    Orders(Vec<Order>),
    Order(Order),
    ReferralCode(String),
    ReferralSummary(ReferralSummary),
    MarketplaceSettings(MarketplaceSettings),
}

#[derive(Debug, Clone)]
struct CacheEntry {
    fetched_at: Timestamp,
    data: CachedData,
}

/// Cache-backed backend client shared by the storefront.
pub struct QueryClient {
    backend: Arc<dyn Backend>,
    stale_time: SignedDuration,
    cache: RwLock<FxHashMap<QueryKey, CacheEntry>>,
}

impl std::fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClient")
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl QueryClient {
    /// Create a client with the default stale time.
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_stale_time(backend, SignedDuration::from_secs(DEFAULT_STALE_SECONDS))
    }

    /// Create a client whose cached reads stay fresh for `stale_time`.
    pub fn with_stale_time(backend: Arc<dyn Backend>, stale_time: SignedDuration) -> Self {
        Self {
            backend,
            stale_time,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Full catalogue.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the catalogue has to be fetched and the call fails.
    pub async fn products(&self) -> Result<Vec<Product>, BackendError> {
        if let Some(CachedData::Products(products)) = self.cached(QueryKey::Products).await {
            return Ok(products);
        }

        let products = self.backend.list_products().await?;

        self.store(QueryKey::Products, CachedData::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// A single product.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown ids, or any other backend error.
    pub async fn product(&self, product_id: ProductId) -> Result<Product, BackendError> {
        let key = QueryKey::Product(product_id);

        if let Some(CachedData::Product(product)) = self.cached(key).await {
            return Ok(product);
        }

        let product = self.backend.get_product(product_id).await?;

        self.store(key, CachedData::Product(product.clone())).await;

        Ok(product)
    }

    /// The caller's orders.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the orders have to be fetched and the call fails.
    pub async fn my_orders(&self) -> Result<Vec<Order>, BackendError> {
        if let Some(CachedData::Orders(orders)) = self.cached(QueryKey::MyOrders).await {
            return Ok(orders);
        }

        let orders = self.backend.list_my_orders().await?;

        self.store(QueryKey::MyOrders, CachedData::Orders(orders.clone()))
            .await;

        Ok(orders)
    }

    /// A single order.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::NotFound`] for unknown ids, or any other backend error.
    pub async fn order(&self, order_id: OrderId) -> Result<Order, BackendError> {
        let key = QueryKey::Order(order_id);

        if let Some(CachedData::Order(order)) = self.cached(key).await {
            return Ok(order);
        }

        let order = self.backend.get_order(order_id).await?;

        self.store(key, CachedData::Order(order.clone())).await;

        Ok(order)
    }

    /// Place an order and invalidate the caller's order list.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged; nothing is invalidated on failure.
    pub async fn create_order(
        &self,
        items: Vec<OrderItem>,
        contact_info: ContactInfo,
        promo_code: Option<String>,
    ) -> Result<Order, BackendError> {
        let order = self
            .backend
            .create_order(items, contact_info, promo_code)
            .await?;

        self.invalidate(&[QueryKey::MyOrders]).await;

        Ok(order)
    }

    /// Create a product and invalidate the catalogue.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product, BackendError> {
        let product = self.backend.create_product(draft).await?;

        self.invalidate(&[QueryKey::Products]).await;

        Ok(product)
    }

    /// Update a product and invalidate the catalogue and that product.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn update_product(
        &self,
        product_id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, BackendError> {
        let product = self.backend.update_product(product_id, draft).await?;

        self.invalidate(&[QueryKey::Products, QueryKey::Product(product_id)])
            .await;

        Ok(product)
    }

    /// Delete a product and invalidate the catalogue and that product.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn delete_product(&self, product_id: ProductId) -> Result<(), BackendError> {
        self.backend.delete_product(product_id).await?;

        self.invalidate(&[QueryKey::Products, QueryKey::Product(product_id)])
            .await;

        Ok(())
    }

    /// The caller's referral code, created by the backend on first request.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] for anonymous callers, or any other backend error.
    pub async fn referral_code(&self) -> Result<String, BackendError> {
        if let Some(CachedData::ReferralCode(code)) = self.cached(QueryKey::ReferralCode).await {
            return Ok(code);
        }

        let code = self.backend.get_or_create_referral_code().await?;

        self.store(QueryKey::ReferralCode, CachedData::ReferralCode(code.clone()))
            .await;

        Ok(code)
    }

    /// The caller's referral activity.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the summary has to be fetched and the call fails.
    pub async fn referral_summary(&self) -> Result<ReferralSummary, BackendError> {
        if let Some(CachedData::ReferralSummary(summary)) =
            self.cached(QueryKey::ReferralSummary).await
        {
            return Ok(summary);
        }

        let summary = self.backend.get_own_referral_summary().await?;

        self.store(
            QueryKey::ReferralSummary,
            CachedData::ReferralSummary(summary.clone()),
        )
        .await;

        Ok(summary)
    }

    /// Apply someone else's referral code and invalidate the referral summary.
    ///
    /// The code is trimmed; a blank code never reaches the backend.
    ///
    /// # Errors
    ///
    /// Returns [`ReferralError::Blank`] for blank input, or the backend's
    /// rejection mapped to a [`ReferralError`].
    pub async fn apply_referral_code(&self, code: &str) -> Result<(), ReferralError> {
        let code = code.trim();

        if code.is_empty() {
            return Err(ReferralError::Blank);
        }

        self.backend.apply_referral_code(code.to_string()).await?;

        self.invalidate(&[QueryKey::ReferralSummary]).await;

        Ok(())
    }

    /// Storefront branding.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the settings have to be fetched and the call fails.
    pub async fn marketplace_settings(&self) -> Result<MarketplaceSettings, BackendError> {
        if let Some(CachedData::MarketplaceSettings(settings)) =
            self.cached(QueryKey::MarketplaceSettings).await
        {
            return Ok(settings);
        }

        let settings = self.backend.get_marketplace_settings().await?;

        self.store(
            QueryKey::MarketplaceSettings,
            CachedData::MarketplaceSettings(settings.clone()),
        )
        .await;

        Ok(settings)
    }

    /// Rename the marketplace and invalidate the settings.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn save_marketplace_name(&self, name: &str) -> Result<(), BackendError> {
        self.backend.save_marketplace_name(name.to_string()).await?;

        self.invalidate(&[QueryKey::MarketplaceSettings]).await;

        Ok(())
    }

    /// Replace the tagline and invalidate the settings.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn update_tagline(&self, tagline: &str) -> Result<(), BackendError> {
        self.backend.update_tagline(tagline.to_string()).await?;

        self.invalidate(&[QueryKey::MarketplaceSettings]).await;

        Ok(())
    }

    /// Replace the logo and invalidate the settings.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged.
    pub async fn save_marketplace_logo(&self, logo: ImageRef) -> Result<(), BackendError> {
        self.backend.save_marketplace_logo(logo).await?;

        self.invalidate(&[QueryKey::MarketplaceSettings]).await;

        Ok(())
    }

    /// Drop the given cached reads.
    pub async fn invalidate(&self, keys: &[QueryKey]) {
        let mut cache = self.cache.write().await;

        for key in keys {
            if cache.remove(key).is_some() {
                debug!(?key, "query invalidated");
            }
        }
    }

    /// Drop every cached read.
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// Whether a fresh cached read exists for `key`.
    pub async fn is_cached(&self, key: QueryKey) -> bool {
        self.cached(key).await.is_some()
    }

    async fn cached(&self, key: QueryKey) -> Option<CachedData> {
        let cache = self.cache.read().await;
        let entry = cache.get(&key)?;

        if Timestamp::now().duration_since(entry.fetched_at) >= self.stale_time {
            debug!(?key, "query stale");
            return None;
        }

        debug!(?key, "query cache hit");

        Some(entry.data.clone())
    }

    async fn store(&self, key: QueryKey, data: CachedData) {
        let entry = CacheEntry {
            fetched_at: Timestamp::now(),
            data,
        };

        self.cache.write().await.insert(key, entry);
    }
}
