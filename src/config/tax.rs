//! Tax and currency mapping tables.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Tax categories known to the fiscal device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxType {
    #[serde(rename = "Exempt")]
    Exempt,
    #[serde(rename = "Zero rated 0%")]
    ZeroRated,
    #[serde(rename = "Standard rated 15%")]
    StandardRated,
    #[serde(rename = "Non-VAT Withholding Tax")]
    NonVatWithholding,
}

/// Authority defaults for a [`TaxType`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxPreset {
    /// Device tax identifier (also used as the tax code).
    pub tax_id: u32,
    pub name: &'static str,
    /// Percent.
    pub rate: Decimal,
}

impl TaxType {
    pub fn preset(&self) -> TaxPreset {
        match self {
            Self::Exempt => TaxPreset {
                tax_id: 1,
                name: "Exempt",
                rate: dec!(0),
            },
            Self::ZeroRated => TaxPreset {
                tax_id: 2,
                name: "Zero rated 0%",
                rate: dec!(0),
            },
            Self::StandardRated => TaxPreset {
                tax_id: 3,
                name: "Standard rated 15%",
                rate: dec!(15),
            },
            Self::NonVatWithholding => TaxPreset {
                tax_id: 514,
                name: "Non-VAT Withholding Tax",
                rate: dec!(10),
            },
        }
    }

    /// Parse the authority's display name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Exempt" => Some(Self::Exempt),
            "Zero rated 0%" => Some(Self::ZeroRated),
            "Standard rated 15%" => Some(Self::StandardRated),
            "Non-VAT Withholding Tax" => Some(Self::NonVatWithholding),
            _ => None,
        }
    }
}

/// Maps a host tax to the authority's tax code, name and rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaxMapping {
    /// Host tax identifier.
    pub tax_id: u64,
    /// Authority tax code.
    pub code: String,
    /// Authority tax name.
    pub name: String,
    /// Rate in percent (0–100).
    pub rate: Decimal,
    pub tax_type: TaxType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl TaxMapping {
    /// Mapping filled from the authority defaults of `tax_type`.
    pub fn from_preset(tax_id: u64, tax_type: TaxType) -> Self {
        let preset = tax_type.preset();
        Self {
            tax_id,
            code: preset.tax_id.to_string(),
            name: preset.name.to_string(),
            rate: preset.rate,
            tax_type,
            description: Some(format!("Auto-filled: {} ({}%)", preset.name, preset.rate)),
            active: true,
        }
    }

    pub fn display_name(&self) -> String {
        format!("{} → {} ({}%)", self.tax_id, self.code, self.rate)
    }
}

/// Maps a host currency to the authority's currency code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyMapping {
    /// Host currency code.
    pub currency: String,
    /// Authority currency code.
    pub code: String,
}

impl CurrencyMapping {
    pub fn new(currency: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            code: code.into(),
        }
    }
}
