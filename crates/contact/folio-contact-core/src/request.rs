//! Submitted form fields and their validation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{ContactError, Result};

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern should compile"));

/// `true` when `email` looks like `local@domain.tld`.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL.is_match(email)
}

/// A contact form submission. Missing JSON fields read as empty strings
/// so they fail validation instead of deserialization.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactRequest {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    /// Trim every field, then check presence and the email shape.
    /// Returns the trimmed request.
    pub fn validate(&self) -> Result<ContactRequest> {
        let trimmed = ContactRequest::new(
            self.name.trim(),
            self.email.trim(),
            self.message.trim(),
        );
        if trimmed.name.is_empty() || trimmed.email.is_empty() || trimmed.message.is_empty() {
            return Err(ContactError::MissingFields);
        }
        if !is_valid_email(&trimmed.email) {
            return Err(ContactError::InvalidEmail);
        }
        Ok(trimmed)
    }
}
