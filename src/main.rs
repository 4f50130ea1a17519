//! Teemarket storefront session
//!
//! Runs one shopping session against the fixture catalogue: fills the cart,
//! checks out and prints the confirmation.

use std::{
    io::{self, Write},
    process::ExitCode,
    sync::Arc,
};

use thiserror::Error;
use tracing::{error, info, warn};

use teemarket::{
    backend::{Backend, BackendError},
    cart::{CartStore, LineItem, LineSelectionError},
    checkout::{Checkout, CheckoutError},
    config::{StorefrontConfig, storefront::StorefrontArgs},
    fixtures::{Caller, FixtureBackend, FixtureError, load_catalogue},
    observability::init_subscriber,
    products::Product,
    query::QueryClient,
    receipt::{ReceiptError, write_cart, write_order},
    storage::{FileStorage, MemoryStorage, SessionStorage},
};

#[derive(Debug, Error)]
enum SessionError {
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Selection(#[from] LineSelectionError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("Failed to write to stdout: {0}")]
    Io(#[from] io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match StorefrontConfig::load() {
        Ok(config) => config,
        Err(error) => {
            #[expect(
                clippy::print_stderr,
                reason = "logging not initialized yet, must use eprintln for config errors"
            )]
            {
                eprintln!("Configuration error: {error}");
            }

            return ExitCode::FAILURE;
        }
    };

    if let Err(error) = init_subscriber(&config.logging) {
        #[expect(
            clippy::print_stderr,
            reason = "logging failed to initialize, nowhere else to report"
        )]
        {
            eprintln!("{error}");
        }

        return ExitCode::FAILURE;
    }

    match run(&config.storefront).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!(%error, "session failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &StorefrontArgs) -> Result<(), SessionError> {
    let products = load_catalogue(&args.fixtures)?;

    info!(
        products = products.len(),
        fixtures = %args.fixtures.display(),
        "catalogue loaded"
    );

    let backend: Arc<dyn Backend> = Arc::new(FixtureBackend::new(products, Caller::Customer));
    let client = QueryClient::with_stale_time(backend, args.stale_time());

    match &args.session_file {
        Some(path) => shop(CartStore::load(FileStorage::new(path)), &client, args).await,
        None => shop(CartStore::load(MemoryStorage::new()), &client, args).await,
    }
}

async fn shop<S: SessionStorage>(
    mut cart: CartStore<S>,
    client: &QueryClient,
    args: &StorefrontArgs,
) -> Result<(), SessionError> {
    let settings = client.marketplace_settings().await?;
    writeln!(
        io::stdout().lock(),
        "{}\n{}\n",
        settings.header_name(),
        settings.header_tagline()
    )?;

    let referral_code = client.referral_code().await?;
    info!(%referral_code, "share your referral code");

    let products = client.products().await?;

    if cart.is_empty() {
        for (product, quantity) in products.iter().take(2).zip([2, 1]) {
            cart.add_to_cart(first_variant(product)?, Some(quantity));
        }
    } else {
        info!(lines = cart.len(), "restored cart from session");
    }

    let mut checkout = Checkout::new();
    checkout.form.email = "asha.rao@example.in".to_string();
    checkout.form.full_name = "Asha Rao".to_string();
    checkout.form.phone = "+91 98450 12345".to_string();
    checkout.form.address_line1 = "12 MG Road".to_string();
    checkout.form.city = "Bengaluru".to_string();
    checkout.form.zip = "560001".to_string();

    if let Some(code) = &args.promo_code {
        checkout.promo.set_input(code.as_str());
        checkout.promo.blur();

        if let Some(message) = checkout.promo.error() {
            warn!(code = %code, reason = message, "promo code not applied");
        }
    }

    let discount = checkout.summary(cart.total_cents());
    write_cart(io::stdout().lock(), cart.lines(), &cart.summary(), Some(&discount))?;

    let confirmation = checkout.submit(&mut cart, client).await?;

    write_order(io::stdout().lock(), &confirmation.order)?;
    info!(route = %confirmation.route, "redirecting to confirmation");

    let orders = client.my_orders().await?;
    info!(orders = orders.len(), cart_lines = cart.len(), "session complete");

    Ok(())
}

fn first_variant(product: &Product) -> Result<LineItem, LineSelectionError> {
    let size = product.sizes.first().map_or("", String::as_str);
    let color = product.colors.first().map_or("", String::as_str);

    LineItem::from_product(product, size, color)
}
