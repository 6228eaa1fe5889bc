//! Mail transport seam.
//!
//! The relay talks to mail infrastructure only through [`Mailer`]. An SMTP
//! implementation lives with the deployment; [`MemoryMailer`] records
//! messages for tests and local development.

use crate::error::ContactError;
use crate::message::Email;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TransportError {
    /// Credentials rejected by the mail server.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Server unreachable or connection dropped.
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("{message}")]
    Other {
        code: Option<String>,
        message: String,
    },
}

impl TransportError {
    pub fn other(message: impl Into<String>) -> Self {
        TransportError::Other {
            code: None,
            message: message.into(),
        }
    }

    /// Transport-specific error code, when the transport reported one.
    pub fn code(&self) -> Option<&str> {
        match self {
            TransportError::Auth(_) => Some("EAUTH"),
            TransportError::Connection(_) => Some("ECONNECTION"),
            TransportError::Other { code, .. } => code.as_deref(),
        }
    }
}

impl From<&TransportError> for ContactError {
    fn from(err: &TransportError) -> Self {
        match err {
            TransportError::Auth(_) => ContactError::AuthFailure,
            TransportError::Connection(_) => ContactError::ConnectionFailure,
            TransportError::Other { .. } => ContactError::Unknown,
        }
    }
}

/// Accepted by the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentMessage {
    pub message_id: String,
}

pub trait Mailer {
    /// Check connectivity and credentials before sending.
    fn verify(&mut self) -> Result<(), TransportError>;

    fn send(&mut self, email: &Email) -> Result<SentMessage, TransportError>;
}

impl<M: Mailer + ?Sized> Mailer for Box<M> {
    fn verify(&mut self) -> Result<(), TransportError> {
        (**self).verify()
    }

    fn send(&mut self, email: &Email) -> Result<SentMessage, TransportError> {
        (**self).send(email)
    }
}

/// Records every accepted message. Failures can be scripted per stage.
#[derive(Clone, Debug, Default)]
pub struct MemoryMailer {
    outbox: Vec<Email>,
    verify_calls: usize,
    fail_verify: Option<TransportError>,
    fail_send: Option<TransportError>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every `verify` fails with `err`.
    pub fn failing_verify(err: TransportError) -> Self {
        Self {
            fail_verify: Some(err),
            ..Self::default()
        }
    }

    /// `verify` passes but every `send` fails with `err`.
    pub fn failing_send(err: TransportError) -> Self {
        Self {
            fail_send: Some(err),
            ..Self::default()
        }
    }

    pub fn outbox(&self) -> &[Email] {
        &self.outbox
    }

    pub fn verify_calls(&self) -> usize {
        self.verify_calls
    }
}

impl Mailer for MemoryMailer {
    fn verify(&mut self) -> Result<(), TransportError> {
        self.verify_calls += 1;
        match &self.fail_verify {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn send(&mut self, email: &Email) -> Result<SentMessage, TransportError> {
        if let Some(err) = &self.fail_send {
            return Err(err.clone());
        }
        self.outbox.push(email.clone());
        Ok(SentMessage {
            message_id: format!("<{}@folio.local>", self.outbox.len()),
        })
    }
}
