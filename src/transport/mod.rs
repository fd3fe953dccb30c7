//! Outbound calls to the fiscal API.
//!
//! [`Transport`] is the seam: the service only hands it a profile, an
//! endpoint suffix and a serialized body. [`HttpTransport`] is the
//! production implementation (feature `http`); tests substitute their own.

#[cfg(feature = "http")]
mod http;
mod response;

#[cfg(feature = "http")]
pub use http::HttpTransport;
pub use response::{Acceptance, parse_legacy_response, parse_pdf_response, parse_v2_response};

use thiserror::Error;

use crate::config::{FiscalConfig, SchemaVersion};
use crate::core::FiscalError;
use crate::payload::Payload;

/// Raw HTTP answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failure before a response was received.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum TransportError {
    #[error("Timeout after {seconds} seconds")]
    Timeout { seconds: u64 },
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),
}

impl From<TransportError> for FiscalError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout { seconds } => FiscalError::TransportTimeout { seconds },
            other => FiscalError::Transport(other.to_string()),
        }
    }
}

/// Sends a serialized body to an endpoint of the profile's API.
pub trait Transport {
    fn post(
        &self,
        config: &FiscalConfig,
        endpoint: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn post(
        &self,
        config: &FiscalConfig,
        endpoint: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post(config, endpoint, body)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn post(
        &self,
        config: &FiscalConfig,
        endpoint: &str,
        body: &str,
    ) -> Result<TransportResponse, TransportError> {
        (**self).post(config, endpoint, body)
    }
}

/// API endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Legacy invoice submission.
    Invoices,
    Invoice,
    CreditNote,
    /// On-demand fiscal PDF retrieval.
    Pdf,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Invoices => "invoices",
            Self::Invoice => "invoice",
            Self::CreditNote => "creditnote",
            Self::Pdf => "pdf",
        }
    }

    /// Where a submission goes: the credit-note endpoint when the payload
    /// carries a credit-note identifier or the document name contains the
    /// profile's refund marker, the invoice endpoint otherwise.
    pub fn for_submission(payload: &Payload, document_name: &str, config: &FiscalConfig) -> Self {
        match config.schema {
            SchemaVersion::Legacy => Self::Invoices,
            SchemaVersion::V2 => {
                let marker = config.refund_marker.as_str();
                if payload.credit_note_id().is_some()
                    || (!marker.is_empty() && document_name.contains(marker))
                {
                    Self::CreditNote
                } else {
                    Self::Invoice
                }
            }
        }
    }
}
