//! Receipts
//!
//! Plain-text renderings of the cart and of placed orders.

use std::io;

use tabled::{
    builder::Builder,
    settings::{
        Alignment, Color, Style,
        object::{Columns, Rows},
    },
};
use thiserror::Error;

use crate::{
    cart::{CartLine, CartSummary},
    money::{format_discount, format_price},
    orders::Order,
    promotions::DiscountOutcome,
};

/// Errors that can occur while writing a receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    /// Writing to the output failed.
    #[error("failed to write receipt: {0}")]
    Io(#[from] io::Error),
}

/// Write the cart lines followed by the subtotal, shipping and total rows.
///
/// When `discount` carries a valid promo, the discount and discounted total
/// are shown below the cart total.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_cart(
    mut out: impl io::Write,
    lines: &[CartLine],
    summary: &CartSummary,
    discount: Option<&DiscountOutcome>,
) -> Result<(), ReceiptError> {
    if lines.is_empty() {
        writeln!(out, "Your cart is empty")?;
        return Ok(());
    }

    let mut builder = Builder::default();

    builder.push_record(["Item", "Size", "Color", "Qty", "Price", "Total"]);

    for line in lines {
        builder.push_record([
            line.item.title.clone(),
            line.item.size.clone(),
            line.item.color.clone(),
            line.quantity.to_string(),
            format_price(line.item.unit_price_cents),
            format_price(line.total_cents()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    table.modify(Rows::first(), Color::BOLD);
    table.modify(Columns::new(3..6), Alignment::right());

    writeln!(out, "\n{table}")?;

    for (label, amount) in summary.rows() {
        writeln!(out, "{label:>10}: {amount}")?;
    }

    if let Some(outcome) = discount.filter(|outcome| outcome.is_valid) {
        writeln!(
            out,
            "{:>10}: {}",
            "Promo",
            format_discount(outcome.discount_cents)
        )?;
        writeln!(
            out,
            "{:>10}: {}",
            "You pay",
            format_price(outcome.final_total_cents)
        )?;
    }

    Ok(())
}

/// Write a short order summary.
///
/// # Errors
///
/// Returns an error if the output cannot be written.
pub fn write_order(mut out: impl io::Write, order: &Order) -> Result<(), ReceiptError> {
    writeln!(out, "Order #{} ({})", order.order_id, order.status)?;
    writeln!(out, "  Items: {}", order.unit_count())?;
    writeln!(out, "  Total: {}", format_price(order.total_cents))?;

    if let Some(code) = order.promo_code.as_deref().filter(|_| order.promo_applied) {
        writeln!(out, "  Promo: {code}")?;
    }

    writeln!(
        out,
        "  Ship to: {}, {}",
        order.contact_info.shipping_address.full_name, order.contact_info.shipping_address.city
    )?;

    Ok(())
}
