//! Referrals
//!
//! Each signed-in shopper has a referral code to share and may apply one
//! code from someone else. The backend owns codes and commissions; this
//! module holds the data shown on the account page and the messages shown
//! when applying a code fails.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::BackendError;

/// Referral activity for the calling user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralSummary {
    /// The user the summary belongs to
    pub referrer: String,

    /// Users who applied this user's code
    pub referred_users: Vec<String>,

    /// Commissions earned so far, in cents
    pub total_commissions_cents: u64,

    /// Commissions not yet paid out, in cents
    pub available_balance_cents: u64,
}

impl ReferralSummary {
    /// Number of users referred.
    pub fn referral_count(&self) -> usize {
        self.referred_users.len()
    }
}

/// Why a referral code could not be applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReferralError {
    /// Nothing was typed.
    #[error("Please enter a referral code")]
    Blank,

    /// The code belongs to the caller.
    #[error("You cannot use your own referral code")]
    OwnCode,

    /// No user has this code.
    #[error("Invalid referral code")]
    UnknownCode,

    /// The caller already applied a code.
    #[error("You have already applied a referral code")]
    AlreadyApplied,

    /// Any other backend failure.
    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for ReferralError {
    fn from(error: BackendError) -> Self {
        let BackendError::Validation(message) = &error else {
            return Self::Backend(error);
        };

        if message.contains("Cannot refer yourself") {
            Self::OwnCode
        } else if message.contains("Invalid referral code") {
            Self::UnknownCode
        } else if message.contains("already applied") {
            Self::AlreadyApplied
        } else {
            Self::Backend(error)
        }
    }
}
