//! Folio Contact Core
//!
//! Validation and delivery of contact form submissions: a relay that turns a
//! validated request into a notification email through a [`Mailer`], and a
//! client that validates locally and makes exactly one call to the relay.

pub mod client;
pub mod config;
pub mod error;
pub mod mailer;
pub mod message;
pub mod relay;
pub mod request;

pub use client::{
    ContactClient, ContactTransport, NetworkError, SubmitError, SubmitReceipt, TransportResponse,
};
pub use config::{ConfigError, RelayConfig};
pub use error::{ContactError, Result};
pub use mailer::{Mailer, MemoryMailer, SentMessage, TransportError};
pub use message::{compose_email, escape_html, Email};
pub use relay::{ContactReceipt, ContactRelay, RelayError, RelayResponse, ResponseBody};
pub use request::{is_valid_email, ContactRequest};
