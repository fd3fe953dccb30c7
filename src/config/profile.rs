use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use super::tax::{CurrencyMapping, TaxMapping};
use super::validate::validate_config;
use crate::core::{DEFAULT_CURRENCY, ValidationError};

/// Wire generation of the fiscal API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVersion {
    /// `/invoices`, float amounts, flat address, single-object response.
    Legacy,
    /// `/invoice` and `/creditnote`, fixed-decimal strings, structured
    /// address, array response.
    #[default]
    V2,
}

impl SchemaVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::V2 => "v2",
        }
    }

    /// Whether this generation has a credit-note contract.
    pub fn supports_credit_notes(&self) -> bool {
        matches!(self, Self::V2)
    }
}

/// Per-company fiscal integration profile.
///
/// Custom `Debug` implementation redacts the `api_key` field.
#[derive(Clone, Serialize, Deserialize)]
pub struct FiscalConfig {
    pub company_id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    /// Base URL of the fiscal API, e.g. `https://fdms.example.co.zw/api`.
    pub api_url: String,
    /// Bearer token.
    pub api_key: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub schema: SchemaVersion,
    #[serde(default)]
    pub tax_mappings: Vec<TaxMapping>,
    #[serde(default)]
    pub currency_mappings: Vec<CurrencyMapping>,
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Fiscalize on creation when the document is already posted.
    #[serde(default)]
    pub auto_fiscalize: bool,
    /// Fiscalize when an invoice is posted.
    #[serde(default)]
    pub auto_fiscalize_invoices: bool,
    /// Fiscalize when an invoice becomes fully paid.
    #[serde(default)]
    pub auto_fiscalize_on_payment: bool,
    /// Marker in a document name that routes it to the credit-note endpoint.
    #[serde(default = "default_refund_marker")]
    pub refund_marker: String,
}

fn default_true() -> bool {
    true
}

fn default_timeout() -> u64 {
    30
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

fn default_refund_marker() -> String {
    "RINV".to_string()
}

impl std::fmt::Debug for FiscalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FiscalConfig")
            .field("company_id", &self.company_id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("schema", &self.schema)
            .field("tax_mappings", &self.tax_mappings)
            .field("currency_mappings", &self.currency_mappings)
            .field("default_currency", &self.default_currency)
            .field("auto_fiscalize", &self.auto_fiscalize)
            .field("auto_fiscalize_invoices", &self.auto_fiscalize_invoices)
            .field("auto_fiscalize_on_payment", &self.auto_fiscalize_on_payment)
            .field("refund_marker", &self.refund_marker)
            .finish()
    }
}

impl FiscalConfig {
    /// Parse and validate a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.checked()
    }

    /// Load connection settings from environment variables.
    ///
    /// Variables:
    /// - `ZIMRA_API_URL` (required)
    /// - `ZIMRA_API_KEY` (required)
    /// - `ZIMRA_COMPANY_ID` (default: 1)
    /// - `ZIMRA_TIMEOUT_SECS` (default: 30)
    /// - `ZIMRA_SCHEMA` (`legacy` or `v2`, default: `v2`)
    ///
    /// Mapping tables and feature flags start empty / disabled.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url =
            std::env::var("ZIMRA_API_URL").map_err(|_| ConfigError::MissingEnv("ZIMRA_API_URL"))?;
        let api_key =
            std::env::var("ZIMRA_API_KEY").map_err(|_| ConfigError::MissingEnv("ZIMRA_API_KEY"))?;
        let schema = match std::env::var("ZIMRA_SCHEMA").ok().as_deref() {
            None | Some("v2") => SchemaVersion::V2,
            Some("legacy") => SchemaVersion::Legacy,
            Some(other) => {
                return Err(ConfigError::Parse(format!(
                    "ZIMRA_SCHEMA must be 'legacy' or 'v2', got '{other}'"
                )));
            }
        };

        FiscalConfigBuilder::new(
            std::env::var("ZIMRA_COMPANY_ID")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            api_url,
            api_key,
        )
        .timeout_secs(
            std::env::var("ZIMRA_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or_else(default_timeout),
        )
        .schema(schema)
        .build()
    }

    /// Run validation and return the profile if it passes.
    pub fn checked(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            Err(ConfigError::Invalid(errors))
        }
    }

    /// All validation errors (not just the first).
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_config(self)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Active mapping for a host tax.
    pub fn tax_mapping(&self, tax_id: u64) -> Option<&TaxMapping> {
        self.tax_mappings
            .iter()
            .find(|m| m.active && m.tax_id == tax_id)
    }

    /// Authority currency code for a host currency, falling back to the
    /// default currency.
    pub fn currency_code(&self, currency: &str) -> &str {
        self.currency_mappings
            .iter()
            .find(|m| m.currency == currency)
            .map(|m| m.code.as_str())
            .unwrap_or(&self.default_currency)
    }

    /// Full URL of an API endpoint, e.g. `invoice` → `{api_url}/invoice`.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
        let raw = format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        );
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(raw, e.to_string()))
    }
}

/// Builder for [`FiscalConfig`]. `build()` validates.
pub struct FiscalConfigBuilder {
    config: FiscalConfig,
}

impl FiscalConfigBuilder {
    pub fn new(company_id: u64, api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            config: FiscalConfig {
                company_id,
                name: String::new(),
                active: true,
                api_url: api_url.into(),
                api_key: api_key.into(),
                timeout_secs: default_timeout(),
                schema: SchemaVersion::default(),
                tax_mappings: Vec::new(),
                currency_mappings: Vec::new(),
                default_currency: default_currency(),
                auto_fiscalize: false,
                auto_fiscalize_invoices: false,
                auto_fiscalize_on_payment: false,
                refund_marker: default_refund_marker(),
            },
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.config.active = active;
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = secs;
        self
    }

    pub fn schema(mut self, schema: SchemaVersion) -> Self {
        self.config.schema = schema;
        self
    }

    pub fn add_tax_mapping(mut self, mapping: TaxMapping) -> Self {
        self.config.tax_mappings.push(mapping);
        self
    }

    pub fn add_currency_mapping(mut self, mapping: CurrencyMapping) -> Self {
        self.config.currency_mappings.push(mapping);
        self
    }

    pub fn default_currency(mut self, code: impl Into<String>) -> Self {
        self.config.default_currency = code.into();
        self
    }

    pub fn auto_fiscalize(mut self, enabled: bool) -> Self {
        self.config.auto_fiscalize = enabled;
        self
    }

    pub fn auto_fiscalize_invoices(mut self, enabled: bool) -> Self {
        self.config.auto_fiscalize_invoices = enabled;
        self
    }

    pub fn auto_fiscalize_on_payment(mut self, enabled: bool) -> Self {
        self.config.auto_fiscalize_on_payment = enabled;
        self
    }

    pub fn refund_marker(mut self, marker: impl Into<String>) -> Self {
        self.config.refund_marker = marker.into();
        self
    }

    pub fn build(self) -> Result<FiscalConfig, ConfigError> {
        self.config.checked()
    }

    /// Build without validation, e.g. to test rejected profiles.
    pub fn build_unchecked(self) -> FiscalConfig {
        self.config
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{0} environment variable is required")]
    MissingEnv(&'static str),
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("cannot parse configuration: {0}")]
    Parse(String),
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
