//! Teemarket
//!
//! Storefront session logic for the Teemarket t-shirt marketplace: a
//! session-persisted cart, promo codes, checkout, referrals, marketplace
//! branding, and a caching query layer over the marketplace backend.

pub mod backend;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod fixtures;
pub mod money;
pub mod observability;
pub mod orders;
pub mod products;
pub mod promotions;
pub mod query;
pub mod receipt;
pub mod referrals;
pub mod settings;
pub mod storage;
