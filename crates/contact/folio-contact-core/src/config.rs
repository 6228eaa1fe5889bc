//! Relay configuration.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const USER_VAR: &str = "EMAIL_USER";
pub const PASS_VAR: &str = "EMAIL_PASS";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("{0} does not look like an email address")]
    InvalidMailbox(String),
}

/// Mailbox credentials. The mailbox is both sender and recipient of
/// notifications.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    pub user: String,
    pub pass: String,
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("user", &self.user)
            .field("pass", &"<redacted>")
            .finish()
    }
}

impl RelayConfig {
    pub fn new(user: impl Into<String>, pass: impl Into<String>) -> Result<Self, ConfigError> {
        let cfg = Self {
            user: user.into(),
            pass: pass.into(),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read `EMAIL_USER` / `EMAIL_PASS` from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the same variables through an arbitrary lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &'static str| {
            let value = lookup(key).filter(|v| !v.trim().is_empty());
            log::debug!("{key} configured: {}", value.is_some());
            value.ok_or(ConfigError::Missing(key))
        };
        let user = read(USER_VAR)?;
        let pass = read(PASS_VAR)?;
        Self::new(user.trim(), pass)
    }

    pub fn mailbox(&self) -> &str {
        &self.user
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.user.trim().is_empty() {
            return Err(ConfigError::Missing(USER_VAR));
        }
        if self.pass.is_empty() {
            return Err(ConfigError::Missing(PASS_VAR));
        }
        if !crate::request::is_valid_email(&self.user) {
            return Err(ConfigError::InvalidMailbox(self.user.clone()));
        }
        Ok(())
    }
}
