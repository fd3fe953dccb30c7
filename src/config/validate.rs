use std::collections::HashSet;

use rust_decimal::Decimal;
use url::Url;

use super::profile::FiscalConfig;
use crate::core::{ValidationError, is_fiscal_currency_code};

/// Validate a fiscal profile. Returns all validation errors found.
pub fn validate_config(config: &FiscalConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    match Url::parse(&config.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::with_rule(
            "api_url",
            format!("unsupported scheme '{}'", url.scheme()),
            "CFG-URL",
        )),
        Err(e) => errors.push(ValidationError::with_rule(
            "api_url",
            format!("not a valid URL: {e}"),
            "CFG-URL",
        )),
    }

    if config.api_key.trim().is_empty() {
        errors.push(ValidationError::with_rule(
            "api_key",
            "API key must not be empty",
            "CFG-KEY",
        ));
    }

    if config.timeout_secs == 0 || config.timeout_secs > 300 {
        errors.push(ValidationError::with_rule(
            "timeout_secs",
            "timeout must be between 1 and 300 seconds",
            "CFG-TIMEOUT",
        ));
    }

    if !is_fiscal_currency_code(&config.default_currency) {
        errors.push(ValidationError::with_rule(
            "default_currency",
            format!("'{}' is not a fiscal currency code", config.default_currency),
            "CFG-CURRENCY",
        ));
    }

    if config.refund_marker.trim().is_empty() {
        errors.push(ValidationError::new(
            "refund_marker",
            "refund marker must not be empty",
        ));
    }

    let mut seen_taxes = HashSet::new();
    for (i, mapping) in config.tax_mappings.iter().enumerate() {
        let field = format!("tax_mappings[{i}]");
        if mapping.rate < Decimal::ZERO || mapping.rate > Decimal::ONE_HUNDRED {
            errors.push(ValidationError::with_rule(
                format!("{field}.rate"),
                "Tax rate must be between 0 and 100%",
                "TAX-RATE",
            ));
        }
        if mapping.code.trim().is_empty() {
            errors.push(ValidationError::with_rule(
                format!("{field}.code"),
                "tax code must not be empty",
                "TAX-CODE",
            ));
        }
        if !seen_taxes.insert(mapping.tax_id) {
            errors.push(ValidationError::with_rule(
                format!("{field}.tax_id"),
                format!("tax {} is already mapped in this profile", mapping.tax_id),
                "TAX-UNIQUE",
            ));
        }
    }

    let mut seen_currencies = HashSet::new();
    for (i, mapping) in config.currency_mappings.iter().enumerate() {
        let field = format!("currency_mappings[{i}]");
        if !is_fiscal_currency_code(&mapping.code) {
            errors.push(ValidationError::with_rule(
                format!("{field}.code"),
                format!("'{}' is not a fiscal currency code", mapping.code),
                "CUR-CODE",
            ));
        }
        if !seen_currencies.insert(mapping.currency.as_str()) {
            errors.push(ValidationError::with_rule(
                format!("{field}.currency"),
                format!("currency {} is already mapped", mapping.currency),
                "CUR-UNIQUE",
            ));
        }
    }

    errors
}
