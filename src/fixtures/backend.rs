//! Fixture Backend

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    backend::{Backend, BackendError},
    orders::{ContactInfo, Order, OrderId, OrderItem, OrderStatus},
    products::{ImageRef, Product, ProductDraft, ProductId},
    promotions::{PromoCode, calculate_discount},
    referrals::ReferralSummary,
    settings::MarketplaceSettings,
};

/// Identity the backend sees for incoming calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Caller {
    /// Not signed in: catalogue reads only.
    Anonymous,

    /// Signed-in shopper.
    Customer,

    /// Signed-in administrator.
    Admin,
}

impl Caller {
    /// User id the backend records for this caller.
    pub fn user_id(self) -> Option<&'static str> {
        match self {
            Self::Anonymous => None,
            Self::Customer => Some("customer"),
            Self::Admin => Some("admin"),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    products: BTreeMap<ProductId, Product>,
    orders: BTreeMap<OrderId, Order>,
    next_product_id: u32,
    next_order_id: u32,
    offline: bool,
    referral_codes: BTreeMap<String, String>,
    referred_by: BTreeMap<String, String>,
    settings: MarketplaceSettings,
}

/// In-process backend over a fixed catalogue.
///
/// Applies the same rules as the hosted marketplace: orders need a signed-in
/// caller and valid items, totals and promo codes are recomputed here,
/// referral codes are per user, and catalogue and branding edits are admin
/// only.
#[derive(Debug)]
pub struct FixtureBackend {
    caller: Caller,
    state: Mutex<State>,
}

impl FixtureBackend {
    /// Serve `products` to `caller`.
    pub fn new(products: impl IntoIterator<Item = Product>, caller: Caller) -> Self {
        let products: BTreeMap<_, _> = products
            .into_iter()
            .map(|product| (product.product_id, product))
            .collect();

        let next_product_id = products
            .keys()
            .next_back()
            .map_or(1, |ProductId(id)| id.saturating_add(1));

        Self {
            caller,
            state: Mutex::new(State {
                products,
                next_product_id,
                next_order_id: 1,
                ..State::default()
            }),
        }
    }

    /// Simulate losing the connection; every call fails with a transport error.
    pub async fn set_offline(&self, offline: bool) {
        self.state.lock().await.offline = offline;
    }

    /// Give `user_id` a known referral code, as if they had requested one earlier.
    pub async fn seed_referral_code(&self, user_id: &str, code: &str) {
        self.state
            .lock()
            .await
            .referral_codes
            .insert(user_id.to_string(), code.to_string());
    }

    fn require_signed_in(&self, action: &str) -> Result<&'static str, BackendError> {
        self.caller
            .user_id()
            .ok_or_else(|| BackendError::Unauthorized(format!("sign in to {action}")))
    }

    fn require_admin(&self, action: &str) -> Result<(), BackendError> {
        if self.caller == Caller::Admin {
            Ok(())
        } else {
            Err(BackendError::Unauthorized(format!(
                "only admins can {action}"
            )))
        }
    }
}

impl State {
    fn ensure_online(&self) -> Result<(), BackendError> {
        if self.offline {
            return Err(BackendError::Transport("connection refused".to_string()));
        }

        Ok(())
    }

    fn referral_code_for(&mut self, user_id: &str) -> String {
        if let Some(code) = self.referral_codes.get(user_id) {
            return code.clone();
        }

        let code = format!("TM{:06}", self.referral_codes.len().saturating_add(1));
        self.referral_codes
            .insert(user_id.to_string(), code.clone());

        code
    }

    fn order_subtotal(&self, items: &[OrderItem]) -> Result<u64, BackendError> {
        if items.is_empty() {
            return Err(BackendError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        items.iter().try_fold(0_u64, |subtotal, item| {
            let product = self.products.get(&item.product_id).ok_or_else(|| {
                BackendError::Validation(format!("Product {} does not exist", item.product_id))
            })?;

            if item.quantity == 0 {
                return Err(BackendError::Validation(format!(
                    "Quantity for {} must be at least 1",
                    product.title
                )));
            }

            if !product.offers_size(&item.size) {
                return Err(BackendError::Validation(format!(
                    "Size {} is not available for {}",
                    item.size, product.title
                )));
            }

            if !product.offers_color(&item.color) {
                return Err(BackendError::Validation(format!(
                    "Color {} is not available for {}",
                    item.color, product.title
                )));
            }

            Ok(subtotal
                .saturating_add(product.price_cents.saturating_mul(u64::from(item.quantity))))
        })
    }
}

fn validate_draft(draft: &ProductDraft) -> Result<(), BackendError> {
    if draft.title.trim().is_empty() {
        return Err(BackendError::Validation("Title is required".to_string()));
    }

    if draft.sizes.is_empty() || draft.colors.is_empty() {
        return Err(BackendError::Validation(
            "At least one size and one color are required".to_string(),
        ));
    }

    Ok(())
}

fn product_from_draft(product_id: ProductId, draft: ProductDraft) -> Product {
    Product {
        product_id,
        title: draft.title,
        description: draft.description,
        price_cents: draft.price_cents,
        sizes: draft.sizes,
        colors: draft.colors,
        image_ref: draft.image_ref,
    }
}

#[async_trait]
impl Backend for FixtureBackend {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;

        Ok(state.products.values().cloned().collect())
    }

    async fn get_product(&self, product_id: ProductId) -> Result<Product, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;

        state
            .products
            .get(&product_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("Product {product_id}")))
    }

    async fn create_order(
        &self,
        items: Vec<OrderItem>,
        contact_info: ContactInfo,
        promo_code: Option<String>,
    ) -> Result<Order, BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_signed_in("place an order")?;

        let subtotal_cents = state.order_subtotal(&items)?;

        let promo_code = promo_code.as_deref().and_then(PromoCode::parse);
        let outcome = calculate_discount(
            subtotal_cents,
            promo_code.as_ref().map(PromoCode::as_str),
        );

        let order_id = OrderId(state.next_order_id);
        state.next_order_id = state.next_order_id.saturating_add(1);

        let order = Order {
            order_id,
            status: OrderStatus::Placed,
            total_cents: outcome.final_total_cents,
            promo_applied: outcome.is_valid,
            promo_code: promo_code.map(PromoCode::into_string),
            items,
            contact_info,
            created_at: Timestamp::now(),
        };

        info!(
            order_id = %order.order_id,
            total_cents = order.total_cents,
            promo_applied = order.promo_applied,
            "order created"
        );

        state.orders.insert(order_id, order.clone());

        Ok(order)
    }

    async fn list_my_orders(&self) -> Result<Vec<Order>, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;
        self.require_signed_in("view your orders")?;

        Ok(state.orders.values().rev().cloned().collect())
    }

    async fn get_order(&self, order_id: OrderId) -> Result<Order, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;
        self.require_signed_in("view your orders")?;

        state
            .orders
            .get(&order_id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(format!("Order {order_id}")))
    }

    async fn create_product(&self, draft: ProductDraft) -> Result<Product, BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("manage products")?;
        validate_draft(&draft)?;

        let product_id = ProductId(state.next_product_id);
        state.next_product_id = state.next_product_id.saturating_add(1);

        let product = product_from_draft(product_id, draft);

        debug!(%product_id, title = %product.title, "product created");

        state.products.insert(product_id, product.clone());

        Ok(product)
    }

    async fn update_product(
        &self,
        product_id: ProductId,
        draft: ProductDraft,
    ) -> Result<Product, BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("manage products")?;
        validate_draft(&draft)?;

        let slot = state
            .products
            .get_mut(&product_id)
            .ok_or_else(|| BackendError::NotFound(format!("Product {product_id}")))?;

        *slot = product_from_draft(product_id, draft);

        debug!(%product_id, "product updated");

        Ok(slot.clone())
    }

    async fn delete_product(&self, product_id: ProductId) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("manage products")?;

        state
            .products
            .remove(&product_id)
            .ok_or_else(|| BackendError::NotFound(format!("Product {product_id}")))?;

        debug!(%product_id, "product deleted");

        Ok(())
    }

    async fn get_or_create_referral_code(&self) -> Result<String, BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        let user_id = self.require_signed_in("get a referral code")?;

        Ok(state.referral_code_for(user_id))
    }

    async fn apply_referral_code(&self, code: String) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        let user_id = self.require_signed_in("apply a referral code")?;

        let code = code.trim();
        let referrer = state
            .referral_codes
            .iter()
            .find_map(|(user, known)| (known == code).then(|| user.clone()))
            .ok_or_else(|| BackendError::Validation(format!("Invalid referral code: {code}")))?;

        if referrer == user_id {
            return Err(BackendError::Validation("Cannot refer yourself".to_string()));
        }

        if state.referred_by.contains_key(user_id) {
            return Err(BackendError::Validation(
                "Referral code already applied".to_string(),
            ));
        }

        info!(%referrer, referred = user_id, "referral recorded");

        state.referred_by.insert(user_id.to_string(), referrer);

        Ok(())
    }

    async fn get_own_referral_summary(&self) -> Result<ReferralSummary, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;
        let user_id = self.require_signed_in("view your referrals")?;

        let referred_users = state
            .referred_by
            .iter()
            .filter(|(_, referrer)| referrer.as_str() == user_id)
            .map(|(user, _)| user.clone())
            .collect();

        Ok(ReferralSummary {
            referrer: user_id.to_string(),
            referred_users,
            ..ReferralSummary::default()
        })
    }

    async fn get_marketplace_settings(&self) -> Result<MarketplaceSettings, BackendError> {
        let state = self.state.lock().await;
        state.ensure_online()?;

        Ok(state.settings.clone())
    }

    async fn save_marketplace_name(&self, name: String) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("rename the marketplace")?;

        let name = name.trim();

        if name.is_empty() {
            return Err(BackendError::Validation(
                "Marketplace name cannot be empty".to_string(),
            ));
        }

        debug!(name, "marketplace renamed");

        state.settings.display_name = name.to_string();

        Ok(())
    }

    async fn update_tagline(&self, tagline: String) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("change the tagline")?;

        state.settings.tagline = tagline.trim().to_string();

        Ok(())
    }

    async fn save_marketplace_logo(&self, logo: ImageRef) -> Result<(), BackendError> {
        let mut state = self.state.lock().await;
        state.ensure_online()?;
        self.require_admin("change the logo")?;

        debug!(logo = logo.display_url(), "marketplace logo replaced");

        state.settings.logo = Some(logo);

        Ok(())
    }
}
