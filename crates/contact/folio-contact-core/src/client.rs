//! Browser-side submission flow.
//!
//! Fields are validated locally first; an invalid form never reaches the
//! transport. A valid form costs exactly one transport call. Network
//! failures and server-reported failures stay distinct so the form can
//! word them differently.

use uuid::Uuid;

use crate::error::ContactError;
use crate::mailer::Mailer;
use crate::relay::{ContactRelay, ResponseBody};
use crate::request::ContactRequest;

pub const SUCCESS_MESSAGE: &str = "Your message has been sent! I'll get back to you soon.";
pub const NETWORK_MESSAGE: &str = "Network error. Please check your connection and try again.";

/// The request never produced a response.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("network error: {0}")]
pub struct NetworkError(pub String);

/// Raw answer from the relay endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

/// How the client reaches the relay (an HTTP `POST` in the browser).
pub trait ContactTransport {
    fn post(&mut self, body: &str) -> Result<TransportResponse, NetworkError>;
}

/// In-process transport, handy for local development and tests.
impl<M: Mailer> ContactTransport for ContactRelay<M> {
    fn post(&mut self, body: &str) -> Result<TransportResponse, NetworkError> {
        let response = self.handle_json(body);
        Ok(TransportResponse {
            status: response.status,
            body: response.body_json(),
        })
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// Rejected before sending.
    #[error("{}", .0.user_message())]
    Invalid(ContactError),

    /// The relay answered with a failure.
    #[error("{message}")]
    Server { kind: ContactError, message: String },

    #[error(transparent)]
    Network(#[from] NetworkError),
}

impl SubmitError {
    pub fn kind(&self) -> Option<ContactError> {
        match self {
            SubmitError::Invalid(kind) | SubmitError::Server { kind, .. } => Some(*kind),
            SubmitError::Network(_) => None,
        }
    }

    /// Text shown next to the form.
    pub fn user_message(&self) -> String {
        match self {
            SubmitError::Invalid(kind) => kind.user_message().to_string(),
            SubmitError::Server { message, .. } => message.clone(),
            SubmitError::Network(_) => NETWORK_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message_id: Option<String>,
    pub submission_id: Option<Uuid>,
}

impl SubmitReceipt {
    pub fn user_message(&self) -> &'static str {
        SUCCESS_MESSAGE
    }
}

#[derive(Debug)]
pub struct ContactClient<T> {
    transport: T,
}

impl<T: ContactTransport> ContactClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Validate, then make a single attempt. No retries.
    pub fn submit(&mut self, request: &ContactRequest) -> Result<SubmitReceipt, SubmitError> {
        let request = request.validate().map_err(SubmitError::Invalid)?;
        let payload = serde_json::to_string(&request).map_err(|e| SubmitError::Server {
            kind: ContactError::Unknown,
            message: e.to_string(),
        })?;

        let response = self.transport.post(&payload)?;
        let body = serde_json::from_str::<ResponseBody>(&response.body).ok();

        if (200..300).contains(&response.status) {
            let body = body.unwrap_or_default();
            return Ok(SubmitReceipt {
                message_id: body.message_id,
                submission_id: body.submission_id,
            });
        }

        let (kind, message) = match body {
            Some(body) => (
                body.code.unwrap_or(ContactError::Unknown),
                Some(body.message).filter(|m| !m.is_empty()),
            ),
            None => (ContactError::Unknown, None),
        };
        let message =
            message.unwrap_or_else(|| ContactError::Unknown.user_message().to_string());
        log::warn!("contact relay answered {}: {message}", response.status);
        Err(SubmitError::Server { kind, message })
    }
}
