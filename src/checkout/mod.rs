//! Checkout
//!
//! Turns the cart and the checkout form into an order.
//!
//! Each call to [`Checkout::submit`] is one attempt: the preconditions are
//! checked locally first, then a single order is placed through the
//! [`QueryClient`]. A successful attempt clears the cart and yields the
//! confirmation route. A failed attempt leaves the cart and the form exactly as
//! they were so the shopper can fix the problem and submit again. Nothing is
//! retried automatically.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::{
    backend::BackendError,
    cart::{CartLine, CartStore},
    orders::{ContactInfo, Order, OrderId, OrderItem},
    promotions::{DiscountOutcome, PromoCode, calculate_discount},
    query::QueryClient,
    storage::SessionStorage,
};

mod form;
mod promo;

pub use form::{CheckoutForm, CheckoutRejection, FormField, is_valid_email};
pub use promo::{INVALID_PROMO_MESSAGE, PromoEntry};

/// Everything needed to place an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    /// One item per cart line
    pub items: Vec<OrderItem>,

    /// Contact and shipping details
    pub contact_info: ContactInfo,

    /// Locally recognised promo code, if any
    pub promo_code: Option<PromoCode>,
}

impl CheckoutRequest {
    /// Assemble a request from cart lines, the form and an optional promo code.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutRejection`] if the cart is empty or the form is
    /// incomplete.
    pub fn assemble(
        lines: &[CartLine],
        form: &CheckoutForm,
        promo_code: Option<PromoCode>,
    ) -> Result<Self, CheckoutRejection> {
        if lines.is_empty() {
            return Err(CheckoutRejection::EmptyCart);
        }

        form.validate()?;

        let items = lines
            .iter()
            .map(|line| OrderItem {
                product_id: line.item.product_id,
                quantity: line.quantity,
                size: line.item.size.clone(),
                color: line.item.color.clone(),
            })
            .collect();

        Ok(Self {
            items,
            contact_info: form.contact_info(),
            promo_code,
        })
    }
}

/// Where the storefront goes after checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The order confirmation page
    OrderConfirmation(OrderId),
}

impl Route {
    /// URL path of the route.
    pub fn path(&self) -> String {
        match self {
            Self::OrderConfirmation(order_id) => format!("/order-confirmation/{order_id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// Why a checkout attempt did not place an order.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// A local precondition failed; the backend was not called.
    #[error(transparent)]
    Rejected(#[from] CheckoutRejection),

    /// The backend refused or could not be reached.
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// This checkout already placed an order; call [`Checkout::reset`] first.
    #[error("Order {0} has already been placed")]
    AlreadySubmitted(OrderId),
}

/// State of the current checkout attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CheckoutState {
    /// Waiting for the shopper to submit.
    #[default]
    Idle,

    /// The last submission was refused locally.
    FormInvalid(CheckoutRejection),

    /// An order request is in flight.
    Submitting,

    /// The order was placed.
    Submitted {
        /// The backend's order id
        order_id: OrderId,
    },

    /// The backend call failed; the shopper may submit again.
    Failed(BackendError),
}

impl CheckoutState {
    /// The order placed by this checkout, if any. Submission is refused
    /// only while this is set; a `Submitting` state left by a dropped
    /// submission still accepts a new one.
    pub fn placed_order_id(&self) -> Option<OrderId> {
        match self {
            Self::Submitted { order_id } => Some(*order_id),
            _ => None,
        }
    }
}

/// A placed order and where to show it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The order as recorded by the backend
    pub order: Order,

    /// Confirmation page route
    pub route: Route,
}

/// Checkout page state: the form, the promo entry and the attempt state.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    /// Contact and shipping form
    pub form: CheckoutForm,

    /// Promo code input
    pub promo: PromoEntry,

    state: CheckoutState,
}

impl Checkout {
    /// A fresh, empty checkout.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the current attempt.
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Order summary totals for `subtotal_cents`, using the applied promo code.
    pub fn summary(&self, subtotal_cents: u64) -> DiscountOutcome {
        calculate_discount(
            subtotal_cents,
            self.promo.applied().map(PromoCode::as_str),
        )
    }

    /// Build the order request for `cart` without sending it.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutRejection`] if the cart is empty or the form is
    /// incomplete.
    pub fn prepare<S: SessionStorage>(
        &self,
        cart: &CartStore<S>,
    ) -> Result<CheckoutRequest, CheckoutRejection> {
        CheckoutRequest::assemble(cart.lines(), &self.form, self.promo.code_for_order())
    }

    /// Start a new checkout for a fresh purchase, keeping the form.
    pub fn reset(&mut self) {
        self.state = CheckoutState::Idle;
    }

    /// Submit the order.
    ///
    /// On success the cart is cleared and the confirmation is returned. On any
    /// failure the cart and form are left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Rejected`] if a precondition fails (no backend
    /// call is made), [`CheckoutError::Backend`] if the backend call fails and
    /// [`CheckoutError::AlreadySubmitted`] if this checkout already placed an order.
    pub async fn submit<S: SessionStorage>(
        &mut self,
        cart: &mut CartStore<S>,
        client: &QueryClient,
    ) -> Result<Confirmation, CheckoutError> {
        if let Some(order_id) = self.state.placed_order_id() {
            return Err(CheckoutError::AlreadySubmitted(order_id));
        }

        let request = match self.prepare(cart) {
            Ok(request) => request,
            Err(rejection) => {
                warn!(%rejection, "checkout rejected");
                self.state = CheckoutState::FormInvalid(rejection.clone());
                return Err(rejection.into());
            }
        };

        self.state = CheckoutState::Submitting;

        let CheckoutRequest {
            items,
            contact_info,
            promo_code,
        } = request;

        let result = client
            .create_order(items, contact_info, promo_code.map(PromoCode::into_string))
            .await;

        match result {
            Ok(order) => {
                info!(
                    order_id = %order.order_id,
                    total_cents = order.total_cents,
                    promo_applied = order.promo_applied,
                    "order placed"
                );

                cart.clear_cart();

                let route = Route::OrderConfirmation(order.order_id);
                self.state = CheckoutState::Submitted {
                    order_id: order.order_id,
                };

                Ok(Confirmation { order, route })
            }
            Err(source) => {
                error!(error = %source, "order creation failed");
                self.state = CheckoutState::Failed(source.clone());

                Err(source.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        backend::MockBackend,
        cart::LineItem,
        orders::OrderStatus,
        products::{ImageRef, ProductId},
        storage::MemoryStorage,
    };

    use super::*;

    fn filled_form() -> CheckoutForm {
        CheckoutForm {
            email: "asha@example.in".to_string(),
            full_name: "Asha Rao".to_string(),
            phone: "9845000000".to_string(),
            address_line1: "12 MG Road".to_string(),
            address_line2: "Flat 4".to_string(),
            city: "Bengaluru".to_string(),
            zip: "560001".to_string(),
        }
    }

    fn cart_with_items() -> CartStore<MemoryStorage> {
        let mut cart = CartStore::load(MemoryStorage::new());

        cart.add_to_cart(
            LineItem {
                product_id: ProductId(1),
                title: "Tee".to_string(),
                unit_price_cents: 500,
                size: "M".to_string(),
                color: "Red".to_string(),
                image_ref: ImageRef::default(),
            },
            Some(2),
        );

        cart
    }

    fn placed_order(
        items: Vec<OrderItem>,
        contact_info: ContactInfo,
        promo: Option<String>,
    ) -> Order {
        Order {
            order_id: OrderId(77),
            status: OrderStatus::Placed,
            total_cents: 1_000,
            promo_applied: promo.is_some(),
            promo_code: promo,
            items,
            contact_info,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    fn client(backend: MockBackend) -> QueryClient {
        QueryClient::new(Arc::new(backend))
    }

    #[tokio::test]
    async fn empty_cart_is_rejected_without_calling_backend() {
        let mut backend = MockBackend::new();
        backend.expect_create_order().never();

        let client = client(backend);
        let mut cart = CartStore::load(MemoryStorage::new());
        let mut checkout = Checkout::new();
        checkout.form = filled_form();

        let result = checkout.submit(&mut cart, &client).await;

        assert_eq!(
            result,
            Err(CheckoutError::Rejected(CheckoutRejection::EmptyCart))
        );
        assert_eq!(
            checkout.state(),
            &CheckoutState::FormInvalid(CheckoutRejection::EmptyCart)
        );
    }

    #[tokio::test]
    async fn invalid_form_is_rejected_and_cart_kept() {
        let mut backend = MockBackend::new();
        backend.expect_create_order().never();

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();
        checkout.form.email = "not-an-email".to_string();

        let result = checkout.submit(&mut cart, &client).await;

        assert_eq!(
            result,
            Err(CheckoutError::Rejected(CheckoutRejection::InvalidEmail))
        );
        assert_eq!(cart.item_count(), 2);
    }

    #[tokio::test]
    async fn successful_submission_clears_cart_and_routes_to_confirmation() -> TestResult {
        let sent = Arc::new(Mutex::new(None));
        let captured = Arc::clone(&sent);

        let mut backend = MockBackend::new();
        backend
            .expect_create_order()
            .times(1)
            .returning(move |items, contact, promo| {
                if let Ok(mut slot) = captured.lock() {
                    *slot = Some((items.clone(), promo.clone()));
                }
                Ok(placed_order(items, contact, promo))
            });

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();
        checkout.promo.set_input(" x7p9k2q4");
        checkout.promo.blur();

        let confirmation = checkout.submit(&mut cart, &client).await?;

        assert_eq!(confirmation.route.path(), "/order-confirmation/77");
        assert_eq!(
            checkout.state(),
            &CheckoutState::Submitted {
                order_id: OrderId(77)
            }
        );
        assert!(cart.is_empty());

        let sent = sent.lock().ok().and_then(|slot| slot.clone());
        let expected_items = vec![OrderItem {
            product_id: ProductId(1),
            quantity: 2,
            size: "M".to_string(),
            color: "Red".to_string(),
        }];

        assert_eq!(sent, Some((expected_items, Some("X7P9K2Q4".to_string()))));

        Ok(())
    }

    #[tokio::test]
    async fn invalid_promo_code_is_omitted() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_create_order()
            .withf(|_, _, promo| promo.is_none())
            .times(1)
            .returning(|items, contact, promo| Ok(placed_order(items, contact, promo)));

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();
        checkout.promo.set_input("HALFOFF");
        checkout.promo.blur();

        let confirmation = checkout.submit(&mut cart, &client).await?;

        assert!(!confirmation.order.promo_applied);

        Ok(())
    }

    #[tokio::test]
    async fn unchecked_promo_code_is_not_sent() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_create_order()
            .withf(|_, _, promo| promo.is_none())
            .times(1)
            .returning(|items, contact, promo| Ok(placed_order(items, contact, promo)));

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();
        checkout.promo.set_input("X7P9K2Q4");

        let shown = checkout.summary(cart.total_cents());
        let confirmation = checkout.submit(&mut cart, &client).await?;

        assert!(!shown.is_valid);
        assert!(!confirmation.order.promo_applied);

        Ok(())
    }

    #[tokio::test]
    async fn backend_failure_preserves_cart_and_form() {
        let mut backend = MockBackend::new();
        backend
            .expect_create_order()
            .times(1)
            .returning(|_, _, _| {
                Err(BackendError::Validation(
                    "Product 1 is out of stock".to_string(),
                ))
            });

        let client = client(backend);
        let mut cart = cart_with_items();
        let lines_before = cart.lines().to_vec();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();
        let form_before = checkout.form.clone();

        let result = checkout.submit(&mut cart, &client).await;

        let failure = BackendError::Validation("Product 1 is out of stock".to_string());
        assert_eq!(result, Err(CheckoutError::Backend(failure.clone())));
        assert_eq!(checkout.state(), &CheckoutState::Failed(failure));
        assert_eq!(checkout.state().placed_order_id(), None);
        assert_eq!(cart.lines(), lines_before.as_slice());
        assert_eq!(checkout.form, form_before);
    }

    #[tokio::test]
    async fn retry_after_failure_is_a_fresh_attempt() -> TestResult {
        let mut backend = MockBackend::new();
        let mut attempts = 0;
        backend
            .expect_create_order()
            .times(2)
            .returning(move |items, contact, promo| {
                attempts += 1;
                if attempts == 1 {
                    Err(BackendError::Transport("connection reset".to_string()))
                } else {
                    Ok(placed_order(items, contact, promo))
                }
            });

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();

        assert!(checkout.submit(&mut cart, &client).await.is_err());
        assert!(!cart.is_empty());

        checkout.submit(&mut cart, &client).await?;
        assert!(cart.is_empty());

        Ok(())
    }

    #[test]
    fn summary_uses_only_the_applied_code() {
        let mut checkout = Checkout::new();

        checkout.promo.set_input("C3B7N1M8");
        assert_eq!(checkout.summary(999).discount_cents, 0);

        checkout.promo.blur();
        let outcome = checkout.summary(999);

        assert_eq!(outcome.discount_cents, 499);
        assert_eq!(outcome.final_total_cents, 500);
    }

    #[test]
    fn assemble_maps_every_line() -> TestResult {
        let cart = cart_with_items();

        let request = CheckoutRequest::assemble(cart.lines(), &filled_form(), None)?;

        assert_eq!(request.items.len(), 1);
        assert_eq!(request.contact_info.email, "asha@example.in");
        assert_eq!(request.promo_code, None);

        Ok(())
    }

    #[tokio::test]
    async fn submitted_checkout_refuses_until_reset() -> TestResult {
        let mut backend = MockBackend::new();
        backend
            .expect_create_order()
            .times(2)
            .returning(|items, contact, promo| Ok(placed_order(items, contact, promo)));

        let client = client(backend);
        let mut cart = cart_with_items();
        let mut checkout = Checkout::new();
        checkout.form = filled_form();

        checkout.submit(&mut cart, &client).await?;

        let mut next_cart = cart_with_items();
        let again = checkout.submit(&mut next_cart, &client).await;
        assert_eq!(again, Err(CheckoutError::AlreadySubmitted(OrderId(77))));
        assert_eq!(next_cart.item_count(), 2);

        checkout.reset();
        checkout.submit(&mut next_cart, &client).await?;
        assert!(next_cart.is_empty());

        Ok(())
    }

    #[test]
    fn submitted_state_does_not_accept_resubmission() {
        let state = CheckoutState::Submitted {
            order_id: OrderId(1),
        };

        assert_eq!(state.placed_order_id(), Some(OrderId(1)));
        assert_eq!(CheckoutState::Idle.placed_order_id(), None);
        assert_eq!(CheckoutState::Submitting.placed_order_id(), None);
    }
}
