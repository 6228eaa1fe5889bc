//! Server side of the contact form: validate, verify the transport, send.
//!
//! One attempt per submission. Failures are categorized and returned to
//! the caller; nothing is retried or queued.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::error::ContactError;
use crate::mailer::{Mailer, TransportError};
use crate::message::compose_email;
use crate::request::ContactRequest;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error(transparent)]
    Rejected(#[from] ContactError),

    #[error("mail transport failed: {0}")]
    Transport(#[from] TransportError),
}

impl RelayError {
    pub fn category(&self) -> ContactError {
        match self {
            RelayError::Rejected(err) => *err,
            RelayError::Transport(err) => ContactError::from(err),
        }
    }
}

/// Confirmation for an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactReceipt {
    pub submission_id: Uuid,
    pub message_id: String,
}

/// JSON body of a relay answer. `code` is set on failures; `error` and
/// `transport_code` only for uncategorized transport failures.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submission_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<ContactError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_code: Option<String>,
}

/// Status plus body, the shape an HTTP route returns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl RelayResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body_json(&self) -> String {
        serde_json::to_string(&self.body).unwrap_or_else(|_| String::from("{}"))
    }

    fn accepted(receipt: ContactReceipt) -> Self {
        Self {
            status: 200,
            body: ResponseBody {
                message: "Email sent successfully".to_string(),
                message_id: Some(receipt.message_id),
                submission_id: Some(receipt.submission_id),
                ..ResponseBody::default()
            },
        }
    }

    fn failed(err: &RelayError) -> Self {
        let category = err.category();
        let mut body = ResponseBody {
            message: category.to_string(),
            code: Some(category),
            ..ResponseBody::default()
        };
        if let RelayError::Transport(t @ TransportError::Other { .. }) = err {
            body.error = Some(t.to_string());
            body.transport_code = t.code().map(str::to_string);
        }
        Self {
            status: category.status(),
            body,
        }
    }
}

#[derive(Debug)]
pub struct ContactRelay<M> {
    config: RelayConfig,
    mailer: M,
}

impl<M: Mailer> ContactRelay<M> {
    pub fn new(config: RelayConfig, mailer: M) -> Self {
        Self { config, mailer }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    pub fn mailer_mut(&mut self) -> &mut M {
        &mut self.mailer
    }

    /// Validate and forward one submission to the configured mailbox.
    pub fn handle(&mut self, request: &ContactRequest) -> Result<ContactReceipt, RelayError> {
        let request = request.validate()?;
        let submission_id = Uuid::new_v4();

        let sent = self.deliver(&request).map_err(|err| {
            log::warn!(
                "contact submission {submission_id}: {err} (code {:?})",
                err.code()
            );
            err
        })?;
        log::info!(
            "contact submission {submission_id} sent as {}",
            sent.message_id
        );
        Ok(ContactReceipt {
            submission_id,
            message_id: sent.message_id,
        })
    }

    fn deliver(
        &mut self,
        request: &ContactRequest,
    ) -> Result<crate::mailer::SentMessage, TransportError> {
        self.mailer.verify()?;
        log::debug!("mail transport verified");
        let email = compose_email(request, self.config.mailbox());
        self.mailer.send(&email)
    }

    /// Route-level entry point: JSON request body in, status and JSON body
    /// out. A body that is not a JSON object counts as missing fields.
    pub fn handle_json(&mut self, body: &str) -> RelayResponse {
        let request = match serde_json::from_str::<ContactRequest>(body) {
            Ok(request) => request,
            Err(err) => {
                log::debug!("unreadable contact body: {err}");
                return RelayResponse::failed(&RelayError::Rejected(ContactError::MissingFields));
            }
        };
        match self.handle(&request) {
            Ok(receipt) => RelayResponse::accepted(receipt),
            Err(err) => RelayResponse::failed(&err),
        }
    }
}
