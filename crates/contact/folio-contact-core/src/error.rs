//! Categorized submission failures.

use serde::{Deserialize, Serialize};

/// Every way a contact submission can fail, as seen by the form.
///
/// `Display` is the relay's message; [`ContactError::user_message`] is the
/// text a form shows when it rejects input before sending anything.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ContactError {
    #[error("Missing required fields: name, email, and message are required")]
    MissingFields,

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Email authentication failed. Please check your credentials.")]
    AuthFailure,

    #[error("Failed to connect to email server. Please try again later.")]
    ConnectionFailure,

    #[error("Failed to send email. Please try again later.")]
    Unknown,
}

impl ContactError {
    pub const ALL: [ContactError; 5] = [
        ContactError::MissingFields,
        ContactError::InvalidEmail,
        ContactError::AuthFailure,
        ContactError::ConnectionFailure,
        ContactError::Unknown,
    ];

    /// Stable wire code (`missing_fields`, `invalid_email`, ...).
    pub fn code(&self) -> &'static str {
        match self {
            ContactError::MissingFields => "missing_fields",
            ContactError::InvalidEmail => "invalid_email",
            ContactError::AuthFailure => "auth_failure",
            ContactError::ConnectionFailure => "connection_failure",
            ContactError::Unknown => "unknown",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.code() == code)
    }

    /// HTTP status the relay answers with.
    pub fn status(&self) -> u16 {
        match self {
            ContactError::MissingFields | ContactError::InvalidEmail => 400,
            _ => 500,
        }
    }

    /// Whether the failure is the submitter's to fix.
    pub fn is_validation(&self) -> bool {
        self.status() == 400
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ContactError::MissingFields => "Please fill in all fields",
            ContactError::InvalidEmail => "Please enter a valid email address",
            _ => "Something went wrong. Please try again.",
        }
    }
}

pub type Result<T, E = ContactError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for err in ContactError::ALL {
            assert_eq!(ContactError::from_code(err.code()), Some(err));
            let json = serde_json::to_string(&err).unwrap();
            assert_eq!(json, format!("\"{}\"", err.code()));
        }
        assert_eq!(ContactError::from_code("teapot"), None);
    }

    #[test]
    fn validation_failures_are_client_errors() {
        assert_eq!(ContactError::MissingFields.status(), 400);
        assert_eq!(ContactError::InvalidEmail.status(), 400);
        assert_eq!(ContactError::AuthFailure.status(), 500);
        assert!(!ContactError::Unknown.is_validation());
    }
}
