//! Wire structures of the fiscal API.
//!
//! Field order and names are part of the contract; the structs serialize
//! in declaration order.

use serde::Serialize;

use crate::core::PayloadError;

/// A built request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Legacy `/invoices` body.
    Legacy(LegacyInvoice),
    /// V2 `/invoice` body.
    Invoice(Invoice),
    /// V2 `/creditnote` body.
    CreditNote(CreditNote),
}

impl Payload {
    pub fn is_credit_note(&self) -> bool {
        matches!(self, Self::CreditNote(_))
    }

    /// Credit-note identifier, present only on credit-note payloads.
    pub fn credit_note_id(&self) -> Option<&str> {
        match self {
            Self::CreditNote(note) => Some(&note.credit_note_id),
            _ => None,
        }
    }

    pub fn is_retry(&self) -> bool {
        match self {
            Self::Legacy(inv) => inv.is_retry,
            Self::Invoice(inv) => inv.is_retry,
            Self::CreditNote(note) => note.is_retry,
        }
    }

    /// Minified body as sent over the wire.
    pub fn to_compact_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string(self).map_err(|e| PayloadError::Serialization(e.to_string()))
    }

    /// Indented body for the audit log.
    pub fn to_pretty_json(&self) -> Result<String, PayloadError> {
        serde_json::to_string_pretty(self).map_err(|e| PayloadError::Serialization(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// V2
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Invoice {
    pub invoice_id: String,
    pub invoice_number: String,
    pub reference: String,
    pub is_discounted: bool,
    pub is_tax_inclusive: bool,
    pub buyer_contact: BuyerContact,
    pub date: String,
    pub line_items: Vec<LineItem>,
    pub sub_total: String,
    pub total_tax: String,
    pub total: String,
    pub currency_code: String,
    pub is_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreditNote {
    pub credit_note_id: String,
    pub credit_note_number: String,
    /// Invoice being credited.
    pub original_invoice_id: String,
    pub reference: String,
    pub is_discounted: bool,
    pub is_tax_inclusive: bool,
    pub buyer_contact: BuyerContact,
    pub date: String,
    pub line_items: Vec<LineItem>,
    pub sub_total: String,
    pub total_tax: String,
    pub total: String,
    pub currency_code: String,
    pub is_retry: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuyerContact {
    pub name: String,
    pub tin: String,
    pub vat_number: String,
    pub address: BuyerAddress,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BuyerAddress {
    pub province: String,
    pub street: String,
    pub house_no: String,
    pub city: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LineItem {
    pub item_code: String,
    pub description: String,
    /// 3 decimals.
    pub quantity: String,
    /// Tax-inclusive amount per unit, 3 decimals.
    pub unit_amount: String,
    pub discount: String,
    pub tax_code: String,
    pub tax_percent: String,
    pub tax_amount: String,
    /// Tax-inclusive line total.
    pub line_amount: String,
}

// ---------------------------------------------------------------------------
// Legacy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegacyInvoice {
    pub invoice_id: String,
    pub invoice_number: String,
    pub reference: String,
    pub is_discounted: bool,
    pub is_tax_inclusive: bool,
    pub buyer_contact: LegacyBuyerContact,
    pub date: String,
    pub line_items: Vec<LegacyLineItem>,
    pub sub_total: f64,
    pub total_tax: f64,
    pub total: f64,
    pub currency_code: String,
    pub is_retry: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegacyBuyerContact {
    pub name: String,
    #[serde(rename = "TIN")]
    pub tin: String,
    /// Flat comma-joined address.
    pub address: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct LegacyLineItem {
    pub item_code: String,
    pub description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub discount: f64,
    pub sub_total: f64,
    pub tax_code: String,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total: f64,
}
