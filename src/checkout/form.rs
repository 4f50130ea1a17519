//! Checkout form

use std::{fmt, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

use crate::orders::{ContactInfo, ShippingAddress};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(EMAIL_PATTERN).ok());

/// Required checkout form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    /// Confirmation email
    Email,

    /// Recipient name
    FullName,

    /// Phone number
    Phone,

    /// First address line
    AddressLine1,

    /// City
    City,

    /// Postal code
    Zip,
}

impl FormField {
    /// Label shown next to the input.
    pub fn label(self) -> &'static str {
        match self {
            Self::Email => "Email",
            Self::FullName => "Full name",
            Self::Phone => "Phone number",
            Self::AddressLine1 => "Address line 1",
            Self::City => "City",
            Self::Zip => "ZIP code",
        }
    }
}

impl fmt::Display for FormField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reasons a checkout is refused before anything is sent to the backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CheckoutRejection {
    /// There is nothing to order.
    #[error("Your cart is empty")]
    EmptyCart,

    /// A required field is blank.
    #[error("{0} is required")]
    MissingField(FormField),

    /// The email address is not of the form `name@domain.tld`.
    #[error("Please enter a valid email address")]
    InvalidEmail,
}

/// Contact and shipping details typed by the shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// Confirmation email
    pub email: String,

    /// Recipient name
    pub full_name: String,

    /// Phone number
    pub phone: String,

    /// First address line
    pub address_line1: String,

    /// Optional second address line
    pub address_line2: String,

    /// City
    pub city: String,

    /// Postal code
    pub zip: String,
}

impl CheckoutForm {
    /// Check the required fields and the email format.
    ///
    /// Fields are checked in display order and the first problem is reported.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutRejection::MissingField`] for a blank required field
    /// and [`CheckoutRejection::InvalidEmail`] for a malformed email.
    pub fn validate(&self) -> Result<(), CheckoutRejection> {
        let required = [
            (FormField::Email, &self.email),
            (FormField::FullName, &self.full_name),
            (FormField::Phone, &self.phone),
            (FormField::AddressLine1, &self.address_line1),
            (FormField::City, &self.city),
            (FormField::Zip, &self.zip),
        ];

        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(CheckoutRejection::MissingField(*field));
        }

        if !is_valid_email(self.email.trim()) {
            return Err(CheckoutRejection::InvalidEmail);
        }

        Ok(())
    }

    /// Contact details as sent with the order.
    pub fn contact_info(&self) -> ContactInfo {
        let address_line2 = self.address_line2.trim();

        ContactInfo {
            email: self.email.trim().to_string(),
            shipping_address: ShippingAddress {
                full_name: self.full_name.trim().to_string(),
                phone: self.phone.trim().to_string(),
                address_line1: self.address_line1.trim().to_string(),
                address_line2: (!address_line2.is_empty()).then(|| address_line2.to_string()),
                city: self.city.trim().to_string(),
                zip: self.zip.trim().to_string(),
            },
        }
    }
}

/// Basic `local@domain.tld` shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|pattern| pattern.is_match(email))
}
