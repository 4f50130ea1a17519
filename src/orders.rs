//! Orders
//!
//! Order data as exchanged with the marketplace backend. Orders are owned by
//! the backend; the storefront only builds order items and contact details and
//! reads orders back for display.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// Backend-assigned order identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(pub u32);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order received.
    Placed,

    /// Order accepted by the marketplace.
    Confirmed,

    /// Order handed to the carrier.
    Shipped,

    /// Order received by the buyer.
    Delivered,

    /// Order cancelled.
    Cancelled,
}

impl OrderStatus {
    /// Human-readable status label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Placed => "Placed",
            Self::Confirmed => "Confirmed",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One purchased product combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product identifier
    pub product_id: ProductId,

    /// Quantity ordered
    pub quantity: u32,

    /// Selected size
    pub size: String,

    /// Selected colour
    pub color: String,
}

/// Shipping address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name
    pub full_name: String,

    /// Contact phone number
    pub phone: String,

    /// First address line
    pub address_line1: String,

    /// Optional second address line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,

    /// City
    pub city: String,

    /// Postal code
    pub zip: String,
}

/// Contact details attached to an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    /// Confirmation email address
    pub email: String,

    /// Where to ship the order
    pub shipping_address: ShippingAddress,
}

/// Order record returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    pub order_id: OrderId,

    /// Fulfilment status
    pub status: OrderStatus,

    /// Authoritative total in cents, after any discount
    pub total_cents: u64,

    /// Whether the backend applied a promo code
    pub promo_applied: bool,

    /// The promo code the backend accepted, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,

    /// Ordered items
    pub items: Vec<OrderItem>,

    /// Contact and shipping snapshot
    pub contact_info: ContactInfo,

    /// Creation time
    pub created_at: Timestamp,
}

impl Order {
    /// Total number of units across all items.
    pub fn unit_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}
