use thiserror::Error;

/// Why a fiscalization attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FiscalError {
    /// No active fiscal configuration for the document's company.
    #[error("No active ZIMRA configuration found for company {company_id}")]
    ConfigurationMissing { company_id: u64 },

    /// The fiscal API did not answer within the configured timeout.
    #[error("Timeout after {seconds} seconds")]
    TransportTimeout { seconds: u64 },

    /// Network failure, non-2xx status or unreadable response.
    #[error("{0}")]
    Transport(String),

    /// Well-formed response carrying an authority-side error.
    #[error("{message}")]
    AuthorityRejected {
        message: String,
        request_id: Option<String>,
    },

    /// The document could not be turned into a payload.
    #[error("payload error: {0}")]
    Payload(#[from] PayloadError),

    /// PDF retrieval answered with a status code instead of a document.
    #[error("fiscal PDF not available (status {0})")]
    PdfUnavailable(i64),

    /// Persistence collaborator failed (audit log, attachments).
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Anything else.
    #[error("{0}")]
    Unexpected(String),
}

impl FiscalError {
    /// Whether the retry sweep should try again. A missing configuration
    /// needs an operator, not another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::ConfigurationMissing { .. })
    }

    /// Authority request identifier, if the response carried one.
    pub fn request_id(&self) -> Option<&str> {
        match self {
            Self::AuthorityRejected { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }
}

/// Errors raised while building a payload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum PayloadError {
    /// The selected wire schema has no contract for this document kind.
    #[error("{schema} schema cannot represent {kind}")]
    UnsupportedDocument { schema: String, kind: String },

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A line figure does not fit a decimal.
    #[error("arithmetic overflow computing {field} of line '{line}'")]
    Overflow { line: String, field: String },
}

/// Builder encountered invalid or missing input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("builder error: {0}")]
pub struct BuildError(pub String);

/// Failure of a host persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// A single validation error with field path and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dot-separated path to the invalid field (e.g. "tax_mappings[0].rate").
    pub field: String,
    /// Human-readable error description.
    pub message: String,
    /// Short rule identifier if applicable (e.g. "TAX-RATE").
    pub rule: Option<String>,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(rule) = &self.rule {
            write!(f, "[{}] {}: {}", rule, self.field, self.message)
        } else {
            write!(f, "{}: {}", self.field, self.message)
        }
    }
}

impl ValidationError {
    /// Create a validation error without a rule ID.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: None,
        }
    }

    /// Create a validation error with a rule ID.
    pub fn with_rule(
        field: impl Into<String>,
        message: impl Into<String>,
        rule: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            rule: Some(rule.into()),
        }
    }
}
